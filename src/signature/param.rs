//! Per-parameter classification.

use std::fmt;
use std::marker::PhantomData;

use ipc_call_codec::{Decode, DecodeError, Decoder, Encode, EncodeError, Encoder};
use serde::Serialize;

/// Structural kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Passed by value.
    Value,
    /// Passed by shared reference.
    Ref,
    /// Passed by mutable reference.
    RefMut,
}

impl ParamKind {
    pub const fn direction(self) -> Direction {
        match self {
            Self::Value | Self::Ref => Direction::In,
            Self::RefMut => Direction::InOut,
        }
    }

    /// Whether the final value travels back in the response.
    pub const fn is_output(self) -> bool {
        matches!(self.direction(), Direction::InOut)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Ref => write!(f, "ref"),
            Self::RefMut => write!(f, "ref mut"),
        }
    }
}

/// Which envelopes carry a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Request only.
    In,
    /// Request, and response after the call.
    InOut,
}

/// One classified parameter.
///
/// The implementing types are markers. On the server a decoded argument is
/// split in two: the part moved into the function (`Owned`) and the part
/// that outlives the call (`Slot`), which the function borrows and which is
/// encoded into the response when the kind is an output.
pub trait Param: 'static {
    /// The value type that goes over the wire.
    type Value: Encode + Decode + 'static;

    /// What the function receives, and what the caller passes.
    type Arg<'a>
    where
        Self: 'a;

    /// Client: the value read back from the response. `()` for input-only
    /// kinds.
    type Output;

    /// Server: the part handed to the function by value.
    type Owned;

    /// Server: the part kept across the call.
    type Slot;

    const KIND: ParamKind;

    /// Client: append the argument's current value to the request.
    fn encode_arg(arg: &Self::Arg<'_>, encoder: &mut Encoder) -> Result<(), EncodeError>;

    /// Client: read this parameter's response value. Reads nothing for
    /// input-only kinds.
    fn decode_output(decoder: &mut Decoder<'_>) -> Result<Self::Output, DecodeError>;

    /// Client: overwrite the caller's argument with a decoded output.
    fn restore_arg(arg: &mut Self::Arg<'_>, output: Self::Output);

    /// Server: read the argument from the request.
    fn decode_holder(
        decoder: &mut Decoder<'_>,
    ) -> Result<(Self::Owned, Self::Slot), DecodeError>;

    /// Server: build the function's argument.
    fn lend(owned: Self::Owned, slot: &mut Self::Slot) -> Self::Arg<'_>;

    /// Server: append the final value to the response. A no-op for
    /// input-only kinds.
    fn encode_output(slot: &Self::Slot, encoder: &mut Encoder) -> Result<(), EncodeError>;
}

/// Marker for kinds that never produce output.
pub trait InputParam: Param {}

/// A parameter declared as `T`.
#[derive(Debug)]
pub struct Val<T>(PhantomData<fn() -> T>);

/// A parameter declared as `&T`.
#[derive(Debug)]
pub struct Ref<T>(PhantomData<fn() -> T>);

/// A parameter declared as `&mut T`.
#[derive(Debug)]
pub struct InOut<T>(PhantomData<fn() -> T>);

impl<T: Encode + Decode + 'static> Param for Val<T> {
    type Value = T;
    type Arg<'a> = T
    where
        Self: 'a;
    type Output = ();
    type Owned = T;
    type Slot = ();

    const KIND: ParamKind = ParamKind::Value;

    fn encode_arg(arg: &T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.put(arg).map(drop)
    }

    fn decode_output(_decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
        Ok(())
    }

    fn restore_arg(_arg: &mut T, _output: ()) {}

    fn decode_holder(decoder: &mut Decoder<'_>) -> Result<(T, ()), DecodeError> {
        Ok((decoder.take()?, ()))
    }

    fn lend(owned: T, _slot: &mut ()) -> T {
        owned
    }

    fn encode_output(_slot: &(), _encoder: &mut Encoder) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl<T: Encode + Decode + 'static> Param for Ref<T> {
    type Value = T;
    type Arg<'a> = &'a T
    where
        Self: 'a;
    type Output = ();
    type Owned = ();
    type Slot = T;

    const KIND: ParamKind = ParamKind::Ref;

    fn encode_arg(arg: &&T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.put(*arg).map(drop)
    }

    fn decode_output(_decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
        Ok(())
    }

    fn restore_arg(_arg: &mut &T, _output: ()) {}

    fn decode_holder(decoder: &mut Decoder<'_>) -> Result<((), T), DecodeError> {
        Ok(((), decoder.take()?))
    }

    fn lend(_owned: (), slot: &mut T) -> &T {
        slot
    }

    fn encode_output(_slot: &T, _encoder: &mut Encoder) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl<T: Encode + Decode + 'static> Param for InOut<T> {
    type Value = T;
    type Arg<'a> = &'a mut T
    where
        Self: 'a;
    type Output = T;
    type Owned = ();
    type Slot = T;

    const KIND: ParamKind = ParamKind::RefMut;

    fn encode_arg(arg: &&mut T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.put(&**arg).map(drop)
    }

    fn decode_output(decoder: &mut Decoder<'_>) -> Result<T, DecodeError> {
        decoder.take()
    }

    fn restore_arg(arg: &mut &mut T, output: T) {
        **arg = output;
    }

    fn decode_holder(decoder: &mut Decoder<'_>) -> Result<((), T), DecodeError> {
        Ok(((), decoder.take()?))
    }

    fn lend(_owned: (), slot: &mut T) -> &mut T {
        slot
    }

    fn encode_output(slot: &T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.put(slot).map(drop)
    }
}

impl<T: Encode + Decode + 'static> InputParam for Val<T> {}
impl<T: Encode + Decode + 'static> InputParam for Ref<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mutable_references_are_outputs() {
        assert_eq!(ParamKind::Value.direction(), Direction::In);
        assert_eq!(ParamKind::Ref.direction(), Direction::In);
        assert_eq!(ParamKind::RefMut.direction(), Direction::InOut);
        assert!(ParamKind::RefMut.is_output());
        assert!(!ParamKind::Ref.is_output());
    }

    #[test]
    fn test_in_out_restores_through_reference() {
        let mut target = 1u16;
        let mut arg: &mut u16 = &mut target;

        let bytes = 9u16.to_le_bytes();
        let mut decoder = Decoder::new(&bytes);
        let output = InOut::<u16>::decode_output(&mut decoder).unwrap();
        assert!(decoder.is_empty());

        InOut::<u16>::restore_arg(&mut arg, output);
        assert_eq!(target, 9);
    }

    #[test]
    fn test_input_kinds_read_no_output() {
        let bytes = [1, 2, 3];
        let mut decoder = Decoder::new(&bytes);
        Val::<u8>::decode_output(&mut decoder).unwrap();
        Ref::<u8>::decode_output(&mut decoder).unwrap();
        assert_eq!(decoder.remaining(), 3);
    }

    #[test]
    fn test_input_kinds_leave_response_untouched() {
        let mut encoder = Encoder::new();
        Ref::<u32>::encode_output(&5, &mut encoder).unwrap();
        Val::<u32>::encode_output(&(), &mut encoder).unwrap();
        assert!(encoder.is_empty());

        InOut::<u32>::encode_output(&5, &mut encoder).unwrap();
        assert_eq!(encoder.as_bytes(), &5u32.to_le_bytes());
    }

    #[test]
    fn test_by_value_argument_moves_into_function() {
        let bytes = [3, 0, 0, 0, 0, 0, 0, 0, b'a', b'b', b'c'];
        let mut decoder = Decoder::new(&bytes);
        let (owned, mut slot) = Val::<String>::decode_holder(&mut decoder).unwrap();
        let arg: String = Val::<String>::lend(owned, &mut slot);
        assert_eq!(arg, "abc");
    }
}
