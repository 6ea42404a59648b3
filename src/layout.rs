use std::convert::TryFrom;

use crate::catalog::Entry;
use crate::Error;
use Error::LayoutOverflow;

/// Size of the fixed MO header: seven 32-bit fields.
pub const HEADER_SIZE: u32 = 28;
/// Size of one (length, offset) pair in a string table.
pub const DESCRIPTOR_SIZE: u32 = 8;

/// Locates one string within the string blob.
/// `length` does not include the terminating NUL byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Descriptor {
    /// Length of the string in bytes.
    pub length: u32,
    /// Offset of the string from the start of the file.
    pub offset: u32,
}

/// Every offset of an MO file holding a given sequence of entries.
///
/// The hash table is never emitted, so its size and offset are always zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    /// Number of entries, header included.
    pub count: u32,
    /// Offset of the table of original string descriptors.
    pub origin_table_offset: u32,
    /// Offset of the table of translation descriptors.
    pub translation_table_offset: u32,
    /// Offset of the first original string.
    pub strings_offset: u32,
    /// One descriptor per original string, in entry order.
    pub origins: Vec<Descriptor>,
    /// One descriptor per translation string, in entry order.
    pub translations: Vec<Descriptor>,
    /// Size of the whole file.
    pub total_size: u32,
}

impl Layout {
    /// Computes the layout for `entries`, which must already be in file order.
    ///
    /// Returns `Error::LayoutOverflow` if any offset would not fit in 32 bits.
    pub fn compute(entries: &[Entry]) -> Result<Layout, Error> {
        let (count, translation_table_offset, strings_offset) = table_offsets(entries.len())?;

        let mut cursor = strings_offset;
        let origins = place(entries.iter().map(|e| e.original.len()), &mut cursor)?;
        let translations = place(entries.iter().map(|e| e.translation.len()), &mut cursor)?;

        Ok(Layout {
            count,
            origin_table_offset: HEADER_SIZE,
            translation_table_offset,
            strings_offset,
            origins,
            translations,
            total_size: cursor,
        })
    }

    /// The hash table size written to the header.
    pub fn hash_table_size(&self) -> u32 {
        0
    }

    /// The hash table offset written to the header.
    pub fn hash_table_offset(&self) -> u32 {
        0
    }
}

/// Returns the entry count, the translation table offset
/// and the offset the string blob starts at.
fn table_offsets(len: usize) -> Result<(u32, u32, u32), Error> {
    let count = u32::try_from(len).map_err(|_| LayoutOverflow)?;
    let table_size = count.checked_mul(DESCRIPTOR_SIZE).ok_or(LayoutOverflow)?;
    let translation_table_offset = HEADER_SIZE.checked_add(table_size).ok_or(LayoutOverflow)?;
    let strings_offset = translation_table_offset
        .checked_add(table_size)
        .ok_or(LayoutOverflow)?;
    Ok((count, translation_table_offset, strings_offset))
}

/// Assigns consecutive descriptors to strings of the given lengths,
/// starting at `cursor` and leaving room for one NUL after each.
fn place<I>(lengths: I, cursor: &mut u32) -> Result<Vec<Descriptor>, Error>
where
    I: ExactSizeIterator<Item = usize>,
{
    let mut descriptors = Vec::with_capacity(lengths.len());
    for len in lengths {
        let length = u32::try_from(len).map_err(|_| LayoutOverflow)?;
        descriptors.push(Descriptor {
            length,
            offset: *cursor,
        });
        *cursor = cursor
            .checked_add(length)
            .and_then(|end| end.checked_add(1))
            .ok_or(LayoutOverflow)?;
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(original: &[u8], translation: &[u8]) -> Entry {
        Entry {
            original: original.to_vec(),
            translation: translation.to_vec(),
        }
    }

    #[test]
    fn test_layout_two_messages() {
        let entries = vec![
            entry(b"", b"Content-Type: text/plain; charset=UTF-8"),
            entry(b"Hello", b"Hallo"),
            entry(b"World", b"Welt"),
        ];
        let layout = Layout::compute(&entries).unwrap();
        assert_eq!(layout.count, 3);
        assert_eq!(layout.origin_table_offset, 28);
        assert_eq!(layout.translation_table_offset, 52);
        assert_eq!(layout.strings_offset, 76);
        assert_eq!(
            layout.origins,
            vec![
                Descriptor { length: 0, offset: 76 },
                Descriptor { length: 5, offset: 77 },
                Descriptor { length: 5, offset: 83 },
            ]
        );
        assert_eq!(layout.translations[0], Descriptor { length: 39, offset: 89 });
        assert_eq!(layout.translations[1], Descriptor { length: 5, offset: 129 });
        assert_eq!(layout.translations[2], Descriptor { length: 4, offset: 135 });
        assert_eq!(layout.total_size, 140);
        assert_eq!(layout.hash_table_size(), 0);
        assert_eq!(layout.hash_table_offset(), 0);
    }

    #[test]
    fn test_layout_header_only() {
        let layout = Layout::compute(&[entry(b"", b"")]).unwrap();
        assert_eq!(layout.translation_table_offset, 36);
        assert_eq!(layout.strings_offset, 44);
        assert_eq!(layout.translations[0].offset, 45);
        assert_eq!(layout.total_size, 46);
    }

    #[test]
    fn test_table_offsets_overflow() {
        assert!(table_offsets(0).is_ok());
        let max_tables = ((u32::MAX - HEADER_SIZE) / (2 * DESCRIPTOR_SIZE)) as usize;
        assert!(table_offsets(max_tables).is_ok());
        match table_offsets(max_tables + 1) {
            Err(LayoutOverflow) => (),
            other => panic!("Expected LayoutOverflow, got {:?}", other),
        }
        assert!(table_offsets(usize::MAX).is_err());
    }

    #[test]
    fn test_place_overflow() {
        let mut cursor = 100;
        let placed = place(vec![10usize, 0].into_iter(), &mut cursor).unwrap();
        assert_eq!(placed[1], Descriptor { length: 0, offset: 111 });
        assert_eq!(cursor, 112);

        let mut cursor = 100;
        match place(vec![(u32::MAX - 100) as usize].into_iter(), &mut cursor) {
            Err(LayoutOverflow) => (),
            other => panic!("Expected LayoutOverflow, got {:?}", other),
        }
        let mut cursor = 0;
        assert!(place(vec![usize::MAX].into_iter(), &mut cursor).is_err());
    }

    proptest! {
        /// Strings are packed back to back, originals first,
        /// with exactly one terminator byte between them.
        #[test]
        fn descriptors_are_contiguous(
            strings in prop::collection::vec(
                (prop::collection::vec(1u8..=255, 0..16), prop::collection::vec(1u8..=255, 0..16)),
                0..32,
            )
        ) {
            let entries: Vec<Entry> = strings.iter().map(|(o, t)| entry(o, t)).collect();
            let layout = Layout::compute(&entries).unwrap();
            let n = entries.len() as u32;
            prop_assert_eq!(layout.count, n);
            prop_assert_eq!(layout.strings_offset, HEADER_SIZE + 16 * n);

            let all: Vec<Descriptor> = layout.origins.iter().chain(&layout.translations).cloned().collect();
            let mut expected = layout.strings_offset;
            for d in &all {
                prop_assert_eq!(d.offset, expected);
                expected = d.offset + d.length + 1;
            }
            prop_assert_eq!(layout.total_size, expected);
        }
    }
}
