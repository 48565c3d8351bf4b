//! Forward-only reader over a borrowed byte slice.

use bincode::Options;

use crate::bounded::{Bounded, Budget};
use crate::{options, Decode, DecodeError};

/// Cursor that values are read from, in the order they were written.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Read the next value.
    ///
    /// No read may go past the end of the input, and sequence lengths are
    /// checked against it, so forged lengths fail fast instead of
    /// allocating or looping. On error the position is unchanged.
    pub fn take<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let mut rest = &self.bytes[self.position..];
        let budget = Budget::new(rest.len());

        let value = {
            let limited = options().with_limit(rest.len() as u64);
            let mut de = bincode::Deserializer::with_reader(&mut rest, limited);
            <T as serde::Deserialize>::deserialize(Bounded::new(&mut de, &budget))
                .map_err(|err| budget.classify(DecodeError::from_format(err)))?
        };

        self.position = self.bytes.len() - rest.len();
        Ok(value)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail if any input is left unread.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_exactly() {
        let bytes = [1, 0, 2, 0, 0, 0, 9];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.take::<u16>().unwrap(), 1);
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.take::<u32>().unwrap(), 2);
        assert_eq!(decoder.remaining(), 1);
        assert_eq!(decoder.finish(), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_failed_take_keeps_position() {
        let bytes = [1, 2, 3];
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.take::<u64>(), Err(DecodeError::UnexpectedEof));
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.take::<u8>().unwrap(), 1);
    }

    #[test]
    fn test_forged_unit_sequence_rejected_quickly() {
        let bytes = (1u64 << 40).to_le_bytes();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(
            decoder.take::<Vec<()>>(),
            Err(DecodeError::TooManyElements { limit: 8 })
        );
    }

    #[test]
    fn test_forged_nested_unit_sequences_rejected() {
        // Three inner vectors each claiming 2^30 units
        let mut bytes = 3u64.to_le_bytes().to_vec();
        for _ in 0..3 {
            bytes.extend_from_slice(&(1u64 << 30).to_le_bytes());
        }
        let mut decoder = Decoder::new(&bytes);
        assert!(matches!(
            decoder.take::<Vec<Vec<[u8; 0]>>>(),
            Err(DecodeError::TooManyElements { .. })
        ));
    }

    #[test]
    fn test_short_unit_sequence_accepted() {
        let bytes = 3u64.to_le_bytes();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.take::<Vec<()>>().unwrap(), vec![(), (), ()]);
        decoder.finish().unwrap();
    }

    #[test]
    fn test_map_entries_count_against_budget() {
        let bytes = (1u64 << 32).to_le_bytes();
        let mut decoder = Decoder::new(&bytes);
        assert!(matches!(
            decoder.take::<std::collections::BTreeMap<(), ()>>(),
            Err(DecodeError::TooManyElements { .. })
        ));
    }
}
