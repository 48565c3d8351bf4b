//! Append-only output buffer.

use bincode::Options;

use crate::{options, Encode, EncodeError};

/// Byte buffer that values are appended to, in call order.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append the encoding of `value`. Returns `self` so calls chain.
    ///
    /// On error the buffer may hold a partial encoding and should be
    /// discarded.
    pub fn put<T: Encode + ?Sized>(&mut self, value: &T) -> Result<&mut Self, EncodeError> {
        options()
            .serialize_into(&mut self.bytes, value)
            .map_err(EncodeError::from_format)?;
        Ok(self)
    }

    /// Append raw bytes with no prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
