use std::borrow::Cow;
use std::error;
use std::fmt;
use std::io;

/// Represents an error encountered while encoding an MO file.
#[derive(Debug)]
pub enum Error {
    /// An invalid byte sequence for UTF-8 has been encountered
    DecodingError,
    /// A plural translation was given without any variants
    EmptyPlural,
    /// A string contained a NUL byte, which terminates strings in the file
    EmbeddedNul,
    /// A message id or context contained the EOT context separator
    ContextSeparator,
    /// A different message was already stored under the same id
    DuplicateMessage(String),
    /// Invalid Plural-Forms metadata
    MalformedMetadata,
    /// The catalog does not fit the 32-bit offsets of the format
    LayoutOverflow,
    /// An I/O error occured
    Io(io::Error),
}
use Error::*;

/// Broad classes of `Error`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The catalog or its options were rejected before encoding
    MalformedInput,
    /// Offset arithmetic exceeded what the format can represent
    LayoutOverflow,
    /// Creating or writing the destination failed
    Io,
}

impl Error {
    /// Returns the class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            LayoutOverflow => ErrorKind::LayoutOverflow,
            Io(_) => ErrorKind::Io,
            _ => ErrorKind::MalformedInput,
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodingError => write!(fmt, "invalid byte sequence in a string"),
            EmptyPlural => write!(fmt, "plural translation has no forms"),
            EmbeddedNul => write!(fmt, "NUL byte in a string"),
            ContextSeparator => write!(fmt, "context separator in a message id"),
            DuplicateMessage(ref id) => write!(fmt, "conflicting duplicate message {:?}", id),
            MalformedMetadata => write!(fmt, "invalid plural forms metadata"),
            LayoutOverflow => write!(fmt, "catalog too large for 32-bit offsets"),
            Io(ref err) => write!(fmt, "{}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(inner: io::Error) -> Error {
        Io(inner)
    }
}

impl From<Cow<'static, str>> for Error {
    fn from(_: Cow<'static, str>) -> Error {
        DecodingError
    }
}

#[test]
fn test_error_kind() {
    assert_eq!(EmptyPlural.kind(), ErrorKind::MalformedInput);
    assert_eq!(DuplicateMessage("x".into()).kind(), ErrorKind::MalformedInput);
    assert_eq!(LayoutOverflow.kind(), ErrorKind::LayoutOverflow);
    let err: Error = io::Error::new(io::ErrorKind::Other, "disk full").into();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.to_string(), "disk full");
}

#[test]
fn test_codec_failure_is_decoding_error() {
    let err: Error = Cow::Borrowed("invalid sequence").into();
    match err {
        DecodingError => (),
        other => panic!("Expected DecodingError, got {:?}", other),
    }
}
