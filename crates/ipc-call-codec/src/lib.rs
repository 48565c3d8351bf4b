//! ipc-call Codec
//!
//! Binary encoding for the values carried in call envelopes, built on
//! `serde` and `bincode`. Any type that derives `Serialize` and
//! `Deserialize` can travel as an argument or return value.
//!
//! The stream carries no type tags: a reader must already know which type
//! comes next, and decoding a value consumes exactly the bytes its encoding
//! produced.
//!
//! Wire rules:
//! - integers and floats: fixed width, little-endian (`usize`/`isize` as 64-bit)
//! - `bool`: one byte, `0` or `1`
//! - `char`: its UTF-8 bytes
//! - strings, sequences and maps: u64 length, then elements
//! - `Option`: one tag byte, then the payload; other enums: u32 variant index
//! - structs, tuples, arrays and `()`: fields only, no prefix
//!
//! ```
//! use ipc_call_codec::{from_bytes, to_bytes};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let p = Point { x: 1, y: -1 };
//! let bytes = to_bytes(&p).unwrap();
//! assert_eq!(bytes.len(), 8);
//! assert_eq!(from_bytes::<Point>(&bytes).unwrap(), p);
//! ```

mod bounded;
pub mod decoder;
pub mod encoder;
pub mod error;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError};

/// A value that can be appended to an [`Encoder`].
pub trait Encode: Serialize {}

impl<T: Serialize + ?Sized> Encode for T {}

/// A value that can be read back from a [`Decoder`].
pub trait Decode: DeserializeOwned {}

impl<T: DeserializeOwned> Decode for T {}

/// Fixed-width little-endian integers, no size limit. Limits are applied
/// per read by the decoder.
fn options() -> impl bincode::Options {
    use bincode::Options;

    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// Encode a single value into a fresh buffer.
pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.put(value)?;
    Ok(encoder.into_bytes())
}

/// Decode a single value, rejecting leftover input.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.take()?;
    decoder.finish()?;
    Ok(value)
}
