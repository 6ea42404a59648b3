use std::path::Path;

use tracing::{debug, info};

use crate::layout::Layout;
use crate::metadata::{MetadataMap, PluralForms};
use crate::writer;
use crate::{Catalog, Error};

/// EncodeOptions allows setting options for encoding MO catalogs.
///
/// # Examples
/// ```
/// use mo_writer::{Catalog, EncodeOptions, PluralForms};
///
/// let mut catalog = Catalog::new();
/// catalog.insert(("file", "files"), vec!["Datei", "Dateien"]).unwrap();
///
/// let bytes = EncodeOptions::new()
///     .plural_forms(PluralForms::new(2, "n != 1").unwrap())
///     .encode(&catalog)
///     .unwrap();
/// assert_eq!(&bytes[..4], &[0xde, 0x12, 0x04, 0x95]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    plural_forms: Option<PluralForms>,
}

impl EncodeOptions {
    /// Returns a new instance of EncodeOptions with default options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the plural rule of the target language
    /// in the `Plural-Forms` header field.
    /// If this option is not enabled, the field is omitted
    /// and loaders fall back to their default rule.
    pub fn plural_forms(mut self, forms: PluralForms) -> Self {
        self.plural_forms = Some(forms);
        self
    }

    /// Returns the header fields the encoded catalog will carry.
    pub fn metadata(&self) -> MetadataMap {
        let map = MetadataMap::new();
        match self.plural_forms {
            Some(ref forms) => map.with_plural_forms(forms),
            None => map,
        }
    }

    /// Computes the layout `catalog` would be encoded with.
    pub fn layout(&self, catalog: &Catalog) -> Result<Layout, Error> {
        let entries = catalog.normalize(&self.metadata().render())?;
        Layout::compute(&entries)
    }

    /// Encodes `catalog` into the bytes of an MO file.
    pub fn encode(&self, catalog: &Catalog) -> Result<Vec<u8>, Error> {
        let entries = catalog.normalize(&self.metadata().render())?;
        let layout = Layout::compute(&entries)?;
        debug!(
            count = layout.count,
            size = layout.total_size,
            "computed catalog layout"
        );
        Ok(writer::serialize(&entries, &layout)?)
    }

    /// Encodes `catalog` and writes it to `path`,
    /// creating missing directories and replacing any existing file.
    ///
    /// The catalog is fully encoded before the file is touched,
    /// so a malformed catalog never leaves a file behind.
    pub fn write<P: AsRef<Path>>(&self, catalog: &Catalog, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = self.encode(catalog)?;
        writer::persist(path, &bytes)?;
        info!(
            path = %path.display(),
            messages = catalog.len(),
            "wrote MO catalog"
        );
        Ok(())
    }
}
