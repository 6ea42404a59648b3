//! This crate writes GNU gettext MO files
//! out of translation catalogs built in your Rust programs.
//!
//! An MO file is the binary form of a translation catalog
//! that gettext runtimes load at startup: a fixed header,
//! two tables of (length, offset) pairs and a blob of NUL-terminated strings
//! ([10.3](https://www.gnu.org/software/gettext/manual/gettext.html#MO-Files)).
//! Messages are stored sorted by their original string,
//! so loaders can binary search them.
//!
//! It contains several differences from `msgfmt`.
//! Notably, this crate never emits the optional hash table,
//! always encodes strings as UTF-8
//! and does not read PO files.
//! Catalogs are built in memory instead.
//!
//! # Example
//!
//! ```ignore
//!
//! use mo_writer::{Catalog, EncodeOptions, MessageId, PluralForms};
//!
//! fn main() {
//!     let mut catalog = Catalog::new();
//!     catalog.insert("Name", "Nom").unwrap();
//!     catalog.insert(("file", "files"), vec!["fichier", "fichiers"]).unwrap();
//!     catalog.insert(MessageId::new("Open").context("menu"), "Ouvrir").unwrap();
//!
//!     EncodeOptions::new()
//!         .plural_forms(PluralForms::new(2, "n > 1").unwrap())
//!         .write(&catalog, "locale/fr/LC_MESSAGES/app.mo")
//!         .expect("could not write the catalog");
//! }
//! ```

#![warn(clippy::all)]
// https://pascalhertleif.de/artikel/good-practices-for-writing-rust-libraries/
#![deny(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

mod catalog;
mod error;
mod layout;
/// Declare a public module named `metadata`.
/// This module contains the header fields stored in every generated catalog,
/// including the plural rule of the target language.
pub mod metadata;
mod options;
mod writer;

pub use crate::catalog::{Catalog, Entry, Message, MessageId, Translation};
pub use crate::error::{Error, ErrorKind};
pub use crate::layout::{Descriptor, Layout, DESCRIPTOR_SIZE, HEADER_SIZE};
pub use crate::metadata::PluralForms;
pub use crate::options::EncodeOptions;
pub use crate::writer::{MAGIC, REVISION};

fn key_with_context(context: &str, key: &str) -> String {
    let mut result = context.to_owned();
    result.push('\x04');
    result.push_str(key);
    result
}

#[test]
fn catalog_impls_send_sync() {
    fn check<T: Send + Sync>(_: T) {}
    check(Catalog::new());
    check(EncodeOptions::new());
}

#[test]
fn test_key_with_context() {
    assert_eq!(key_with_context("menu", "Open"), "menu\x04Open");
    assert_eq!(key_with_context("", ""), "\x04");
}
