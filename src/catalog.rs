use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;
use std::slice;

use encoding::all::UTF_8;
use encoding::{DecoderTrap, EncoderTrap, Encoding};
use tracing::debug;

use super::key_with_context;
use crate::{EncodeOptions, Error};
use Error::{ContextSeparator, DuplicateMessage, EmbeddedNul, EmptyPlural};

const NUL: u8 = 0;

fn encode_text(text: &str) -> Result<Vec<u8>, Error> {
    Ok(UTF_8.encode(text, EncoderTrap::Strict)?)
}

fn decode_text(bytes: &[u8]) -> Result<String, Error> {
    Ok(UTF_8.decode(bytes, DecoderTrap::Strict)?)
}

fn check_nul(text: &str) -> Result<(), Error> {
    if text.bytes().any(|b| b == NUL) {
        Err(EmbeddedNul)
    } else {
        Ok(())
    }
}

/// The translated side of a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Translation {
    /// A single translated string.
    Single(String),
    /// One translated string per plural form of the target language.
    Plural(Vec<String>),
}

impl Translation {
    /// Constructs a singular translation.
    pub fn single<T: Into<String>>(text: T) -> Self {
        Translation::Single(text.into())
    }

    /// Constructs a plural translation from its forms, in plural form order.
    pub fn plural<I, T>(forms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Translation::Plural(forms.into_iter().map(Into::into).collect())
    }

    /// Constructs a singular translation out of raw bytes,
    /// which must be valid UTF-8.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, Error> {
        decode_text(bytes).map(Translation::Single)
    }

    /// Returns the translated strings, one for a singular translation.
    pub fn forms(&self) -> &[String] {
        match *self {
            Translation::Single(ref text) => slice::from_ref(text),
            Translation::Plural(ref forms) => forms,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.forms().is_empty() {
            return Err(EmptyPlural);
        }
        self.forms().iter().try_for_each(|form| check_nul(form))
    }

    fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::new();
        for (i, form) in self.forms().iter().enumerate() {
            if i > 0 {
                bytes.push(NUL);
            }
            bytes.extend(encode_text(form)?);
        }
        Ok(bytes)
    }
}

impl<'a> From<&'a str> for Translation {
    fn from(text: &'a str) -> Self {
        Translation::single(text)
    }
}

impl From<String> for Translation {
    fn from(text: String) -> Self {
        Translation::Single(text)
    }
}

impl<'a> From<Vec<&'a str>> for Translation {
    fn from(forms: Vec<&'a str>) -> Self {
        Translation::plural(forms)
    }
}

impl From<Vec<String>> for Translation {
    fn from(forms: Vec<String>) -> Self {
        Translation::Plural(forms)
    }
}

/// Identifies a message: the original string,
/// its optional plural form and an optional disambiguating context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageId {
    /// The context the message is used in, if any.
    pub context: Option<String>,
    /// The original string, used as the lookup key.
    pub singular: String,
    /// The plural form of the original string, used with ngettext.
    pub plural: Option<String>,
}

impl MessageId {
    /// Constructs a message id without a plural form.
    pub fn new<T: Into<String>>(singular: T) -> Self {
        MessageId {
            context: None,
            singular: singular.into(),
            plural: None,
        }
    }

    /// Constructs a message id with a plural form.
    pub fn with_plural<T: Into<String>>(singular: T, plural: T) -> Self {
        MessageId {
            context: None,
            singular: singular.into(),
            plural: Some(plural.into()),
        }
    }

    /// Places the message in the given context.
    pub fn context<T: Into<String>>(mut self, context: T) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Constructs a message id out of raw bytes,
    /// which must be valid UTF-8.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, Error> {
        decode_text(bytes).map(MessageId::new)
    }

    fn is_header(&self) -> bool {
        self.context.is_none() && self.singular.is_empty()
    }

    fn key(&self) -> (Option<String>, String) {
        (self.context.clone(), self.singular.clone())
    }

    fn lookup_key(&self) -> String {
        match self.context {
            Some(ref ctxt) => key_with_context(ctxt, &self.singular),
            None => self.singular.clone(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let keyed = self.context.iter().chain(Some(&self.singular));
        for text in keyed {
            check_nul(text)?;
            if text.contains('\x04') {
                return Err(ContextSeparator);
            }
        }
        match self.plural {
            Some(ref plural) => check_nul(plural),
            None => Ok(()),
        }
    }

    /// `[context EOT] singular [NUL plural]`
    fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = encode_text(&self.lookup_key())?;
        if let Some(ref plural) = self.plural {
            bytes.push(NUL);
            bytes.extend(encode_text(plural)?);
        }
        Ok(bytes)
    }
}

impl<'a> From<&'a str> for MessageId {
    fn from(singular: &'a str) -> Self {
        MessageId::new(singular)
    }
}

impl From<String> for MessageId {
    fn from(singular: String) -> Self {
        MessageId::new(singular)
    }
}

impl<'a> From<(&'a str, &'a str)> for MessageId {
    fn from((singular, plural): (&'a str, &'a str)) -> Self {
        MessageId::with_plural(singular, plural)
    }
}

/// A message id together with its translation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    /// What is being translated.
    pub id: MessageId,
    /// The translation of `id`.
    pub translation: Translation,
}

impl Message {
    /// Constructs a new `Message` out of anything convertible to its parts.
    pub fn new<I: Into<MessageId>, T: Into<Translation>>(id: I, translation: T) -> Self {
        Message {
            id: id.into(),
            translation: translation.into(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        self.id.validate()?;
        self.translation.validate()
    }

    fn encode(&self) -> Result<Entry, Error> {
        Ok(Entry {
            original: self.id.encode()?,
            translation: self.translation.encode()?,
        })
    }
}

/// One normalized record, as stored in the MO file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub(crate) original: Vec<u8>,
    pub(crate) translation: Vec<u8>,
}

impl Entry {
    /// The original string, including context and plural parts.
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// The translation, plural forms separated by NUL bytes.
    pub fn translation(&self) -> &[u8] {
        &self.translation
    }
}

/// Catalog represents a set of messages
/// to be encoded into one MO file.
///
/// Messages are keyed by their context and singular id.
/// The empty id outside of any context is reserved for the catalog header,
/// which is generated when encoding; messages inserted under it are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    messages: BTreeMap<(Option<String>, String), Message>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog {
            messages: BTreeMap::new(),
        }
    }

    /// Creates an empty catalog.
    ///
    /// Encoding it produces a file containing only the header.
    pub fn empty() -> Self {
        Self::new()
    }

    /// Builds a catalog out of `(id, translation)` pairs
    /// with the same duplicate policy as `insert`.
    pub fn from_entries<E, I, T>(entries: E) -> Result<Self, Error>
    where
        E: IntoIterator<Item = (I, T)>,
        I: Into<MessageId>,
        T: Into<Translation>,
    {
        let mut catalog = Catalog::new();
        for (id, translation) in entries {
            catalog.insert(id, translation)?;
        }
        Ok(catalog)
    }

    /// Adds a message to the catalog.
    ///
    /// Inserting a message identical to an already stored one is a no-op.
    /// Returns `Error::DuplicateMessage` if a different message is stored
    /// under the same context and id; use `overwrite` to replace it.
    pub fn insert<I, T>(&mut self, id: I, translation: T) -> Result<(), Error>
    where
        I: Into<MessageId>,
        T: Into<Translation>,
    {
        let msg = match self.admit(Message::new(id, translation))? {
            Some(msg) => msg,
            None => return Ok(()),
        };
        match self.messages.entry(msg.id.key()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(msg);
                Ok(())
            }
            btree_map::Entry::Occupied(ref slot) if *slot.get() == msg => Ok(()),
            btree_map::Entry::Occupied(_) => Err(DuplicateMessage(msg.id.lookup_key())),
        }
    }

    /// Adds a message to the catalog,
    /// replacing whatever was stored under the same context and id.
    pub fn overwrite<I, T>(&mut self, id: I, translation: T) -> Result<(), Error>
    where
        I: Into<MessageId>,
        T: Into<Translation>,
    {
        if let Some(msg) = self.admit(Message::new(id, translation))? {
            self.messages.insert(msg.id.key(), msg);
        }
        Ok(())
    }

    fn admit(&self, msg: Message) -> Result<Option<Message>, Error> {
        if msg.id.is_header() {
            debug!("dropping message with the reserved header id");
            return Ok(None);
        }
        msg.validate()?;
        Ok(Some(msg))
    }

    /// Returns the message stored under `msg_id` outside of any context.
    pub fn get(&self, msg_id: &str) -> Option<&Message> {
        self.messages.get(&(None, msg_id.to_owned()))
    }

    /// Returns the message stored under `msg_id` in the context `msg_context`.
    pub fn get_with_context(&self, msg_context: &str, msg_id: &str) -> Option<&Message> {
        self.messages
            .get(&(Some(msg_context.to_owned()), msg_id.to_owned()))
    }

    /// Returns the number of messages, not counting the header.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the catalog holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over the messages, ordered by context and id.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Encodes the catalog into the bytes of an MO file.
    ///
    /// Calling this method is equivalent to calling
    /// `EncodeOptions::new().encode(self)`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        EncodeOptions::new().encode(self)
    }

    /// Encodes the catalog and writes it to `path`,
    /// creating missing parent directories.
    ///
    /// Calling this method is equivalent to calling
    /// `EncodeOptions::new().write(self, path)`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use mo_writer::Catalog;
    ///
    /// let catalog = Catalog::from_entries(vec![("Hello", "Bonjour")]).unwrap();
    /// catalog.write("locale/fr/LC_MESSAGES/app.mo").unwrap();
    /// ```
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        EncodeOptions::new().write(self, path)
    }

    /// Encodes every message and orders them by their original bytes,
    /// preceded by the header entry carrying `header`.
    pub(crate) fn normalize(&self, header: &str) -> Result<Vec<Entry>, Error> {
        let mut entries = Vec::with_capacity(self.messages.len() + 1);
        entries.push(Entry {
            original: Vec::new(),
            translation: encode_text(header)?,
        });

        let mut messages = self
            .messages
            .values()
            .map(Message::encode)
            .collect::<Result<Vec<_>, _>>()?;
        messages.sort_by(|a, b| a.original.cmp(&b.original));
        entries.extend(messages);

        debug!(entries = entries.len(), "normalized catalog");
        Ok(entries)
    }
}
