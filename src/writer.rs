use std::fs;
use std::io::{self, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use crate::catalog::Entry;
use crate::layout::{Descriptor, Layout};

/// Magic number opening every little-endian MO file.
pub const MAGIC: u32 = 0x9504_12de;
/// The only file format revision written.
pub const REVISION: u32 = 0;

fn write_descriptors<W: Write>(w: &mut W, table: &[Descriptor]) -> io::Result<()> {
    for d in table {
        w.write_u32::<LittleEndian>(d.length)?;
        w.write_u32::<LittleEndian>(d.offset)?;
    }
    Ok(())
}

/// Writes the MO representation of `entries`, laid out by `layout`, to `w`.
pub fn write_catalog<W: Write>(w: &mut W, entries: &[Entry], layout: &Layout) -> io::Result<()> {
    w.write_u32::<LittleEndian>(MAGIC)?;
    w.write_u32::<LittleEndian>(REVISION)?;
    w.write_u32::<LittleEndian>(layout.count)?;
    w.write_u32::<LittleEndian>(layout.origin_table_offset)?;
    w.write_u32::<LittleEndian>(layout.translation_table_offset)?;
    w.write_u32::<LittleEndian>(layout.hash_table_size())?;
    w.write_u32::<LittleEndian>(layout.hash_table_offset())?;

    write_descriptors(w, &layout.origins)?;
    write_descriptors(w, &layout.translations)?;

    for e in entries {
        w.write_all(&e.original)?;
        w.write_u8(0)?;
    }
    for e in entries {
        w.write_all(&e.translation)?;
        w.write_u8(0)?;
    }
    Ok(())
}

/// Serializes the catalog into a freshly allocated buffer.
pub fn serialize(entries: &[Entry], layout: &Layout) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(layout.total_size as usize);
    write_catalog(&mut buf, entries, layout)?;
    debug_assert_eq!(buf.len(), layout.total_size as usize);
    Ok(buf)
}

/// Writes `bytes` to `path`, creating missing parent directories
/// and replacing any existing file.
///
/// A failed write may leave a partial file behind.
pub fn persist(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, ReadBytesExt};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn entry(original: &[u8], translation: &[u8]) -> Entry {
        Entry {
            original: original.to_vec(),
            translation: translation.to_vec(),
        }
    }

    #[test]
    fn test_write_catalog_bytes() {
        let entries = vec![entry(b"", b"h"), entry(b"a", b"bc")];
        let layout = Layout::compute(&entries).unwrap();
        let bytes = serialize(&entries, &layout).unwrap();

        let mut expected = vec![
            0xde, 0x12, 0x04, 0x95, // magic
            0, 0, 0, 0, // revision
            2, 0, 0, 0, // count
            28, 0, 0, 0, // origin table
            44, 0, 0, 0, // translation table
            0, 0, 0, 0, // hash size
            0, 0, 0, 0, // hash offset
            0, 0, 0, 0, 60, 0, 0, 0, // ""
            1, 0, 0, 0, 61, 0, 0, 0, // "a"
            1, 0, 0, 0, 63, 0, 0, 0, // "h"
            2, 0, 0, 0, 65, 0, 0, 0, // "bc"
        ];
        expected.extend_from_slice(b"\0a\0h\0bc\0");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_header_fields_are_little_endian() {
        let entries = vec![entry(b"", b""); 3];
        let layout = Layout::compute(&entries).unwrap();
        let bytes = serialize(&entries, &layout).unwrap();
        assert_eq!(LittleEndian::read_u32(&bytes[0..4]), MAGIC);

        let mut rdr = Cursor::new(&bytes[4..28]);
        let fields: Vec<u32> = (0..6)
            .map(|_| rdr.read_u32::<LittleEndian>().unwrap())
            .collect();
        assert_eq!(fields, vec![0, 3, 28, 52, 0, 0]);
        assert_eq!(bytes.len() as u32, layout.total_size);
    }

    #[test]
    fn test_persist_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("de").join("LC_MESSAGES").join("test.mo");
        persist(&path, b"first").unwrap();
        persist(&path, b"2nd").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"2nd");
    }

    #[test]
    fn test_persist_reports_io_errors() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        // a regular file where a directory is needed
        assert!(persist(&blocker.join("test.mo"), b"x").is_err());
    }
}
