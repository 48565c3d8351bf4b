//! Codec errors.

use std::io;

use bincode::ErrorKind;

/// Failure while reading a value back from bytes.
///
/// Any of these is fatal for the envelope being decoded; there is no partial
/// recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid char encoding")]
    InvalidChar,

    #[error("invalid UTF-8 in string (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("invalid enum tag {0}")]
    InvalidTag(usize),

    #[error("sequence lengths exceed the {limit} bytes of input")]
    TooManyElements { limit: usize },

    #[error("type needs a self-describing format")]
    SelfDescribing,

    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),

    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Build a free-form error for hand-written `Deserialize` impls.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Reads are bounded by the bytes remaining, so a size-limit hit and a
    /// short read both mean the input ended early.
    pub(crate) fn from_format(err: bincode::Error) -> Self {
        match *err {
            ErrorKind::SizeLimit => Self::UnexpectedEof,
            ErrorKind::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Self::UnexpectedEof
            }
            ErrorKind::InvalidBoolEncoding(byte) => Self::InvalidBool(byte),
            ErrorKind::InvalidCharEncoding => Self::InvalidChar,
            ErrorKind::InvalidUtf8Encoding(e) => Self::InvalidUtf8 {
                valid_up_to: e.valid_up_to(),
            },
            ErrorKind::InvalidTagEncoding(tag) => Self::InvalidTag(tag),
            ErrorKind::DeserializeAnyNotSupported => Self::SelfDescribing,
            ErrorKind::Custom(message) => Self::Custom(message),
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Failure while appending a value.
///
/// Derived `Serialize` impls over std types never fail; these come from
/// hand-written impls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("sequence length must be known before encoding")]
    UnknownLength,

    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    pub(crate) fn from_format(err: bincode::Error) -> Self {
        match *err {
            ErrorKind::SequenceMustHaveLength => Self::UnknownLength,
            ErrorKind::Custom(message) => Self::Custom(message),
            other => Self::Custom(other.to_string()),
        }
    }
}
