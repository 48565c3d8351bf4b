//! Ordered parameter lists.
//!
//! Requests carry every parameter in declaration order. Responses carry the
//! return value first, then each output parameter in reverse declaration
//! order, so decoding walks the list backwards. Both ends implement that
//! order here, once per arity.

use ipc_call_codec::{DecodeError, Decoder, EncodeError, Encoder};

use super::descriptor::ParamDescriptor;
use super::param::{InputParam, Param, ParamKind};

/// A tuple of [`Param`]s, arity 0 to 8.
pub trait ParamList: Sized + 'static {
    /// Tuple of live arguments, as the caller passes them.
    type Args<'a>;

    /// Tuple of decoded response values, one per parameter.
    type Outputs;

    /// Tuple of values moved into the function.
    type Owned;

    /// Tuple of values kept across the call.
    type Slots;

    const KINDS: &'static [ParamKind];

    fn describe() -> Vec<ParamDescriptor>;

    /// Client: encode every argument, declaration order.
    fn encode_args(args: &Self::Args<'_>, encoder: &mut Encoder) -> Result<(), EncodeError>;

    /// Client: read every output, reverse declaration order. Nothing is
    /// written to the caller's arguments yet.
    fn decode_outputs(decoder: &mut Decoder<'_>) -> Result<Self::Outputs, DecodeError>;

    /// Client: write decoded outputs back into the caller's arguments.
    fn restore_outputs(args: &mut Self::Args<'_>, outputs: Self::Outputs);

    /// Server: decode every argument, declaration order.
    fn decode_holders(
        decoder: &mut Decoder<'_>,
    ) -> Result<(Self::Owned, Self::Slots), DecodeError>;

    /// Server: encode every output slot, reverse declaration order.
    fn encode_outputs(slots: &Self::Slots, encoder: &mut Encoder) -> Result<(), EncodeError>;
}

/// Parameter lists with no output-capable parameter.
///
/// Fire-and-forget calls require this: with no response there is nowhere to
/// carry an output back.
pub trait InputOnly: ParamList {}

impl ParamList for () {
    type Args<'a> = ();
    type Outputs = ();
    type Owned = ();
    type Slots = ();

    const KINDS: &'static [ParamKind] = &[];

    fn describe() -> Vec<ParamDescriptor> {
        Vec::new()
    }

    fn encode_args(_args: &(), _encoder: &mut Encoder) -> Result<(), EncodeError> {
        Ok(())
    }

    fn decode_outputs(_decoder: &mut Decoder<'_>) -> Result<(), DecodeError> {
        Ok(())
    }

    fn restore_outputs(_args: &mut (), _outputs: ()) {}

    fn decode_holders(_decoder: &mut Decoder<'_>) -> Result<((), ()), DecodeError> {
        Ok(((), ()))
    }

    fn encode_outputs(_slots: &(), _encoder: &mut Encoder) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl InputOnly for () {}

// Each invocation lists the parameters twice: declaration order, then
// reverse order for the response side.
macro_rules! impl_param_list {
    ([$($P:ident $idx:tt $out:ident),+] [$($R:ident $ridx:tt $rout:ident),+]) => {
        impl<$($P: Param),+> ParamList for ($($P,)+) {
            type Args<'a> = ($($P::Arg<'a>,)+);
            type Outputs = ($($P::Output,)+);
            type Owned = ($($P::Owned,)+);
            type Slots = ($($P::Slot,)+);

            const KINDS: &'static [ParamKind] = &[$($P::KIND),+];

            fn describe() -> Vec<ParamDescriptor> {
                vec![$(ParamDescriptor::of::<$P>()),+]
            }

            fn encode_args(
                args: &Self::Args<'_>,
                encoder: &mut Encoder,
            ) -> Result<(), EncodeError> {
                $($P::encode_arg(&args.$idx, encoder)?;)+
                Ok(())
            }

            fn decode_outputs(decoder: &mut Decoder<'_>) -> Result<Self::Outputs, DecodeError> {
                $(let $rout = $R::decode_output(decoder)?;)+
                Ok(($($out,)+))
            }

            fn restore_outputs(args: &mut Self::Args<'_>, outputs: Self::Outputs) {
                $($P::restore_arg(&mut args.$idx, outputs.$idx);)+
            }

            fn decode_holders(
                decoder: &mut Decoder<'_>,
            ) -> Result<(Self::Owned, Self::Slots), DecodeError> {
                $(let $out = $P::decode_holder(decoder)?;)+
                Ok((($($out.0,)+), ($($out.1,)+)))
            }

            fn encode_outputs(
                slots: &Self::Slots,
                encoder: &mut Encoder,
            ) -> Result<(), EncodeError> {
                $($R::encode_output(&slots.$ridx, encoder)?;)+
                Ok(())
            }
        }

        impl<$($P: InputParam),+> InputOnly for ($($P,)+) {}
    };
}

impl_param_list!([P1 0 a1] [P1 0 a1]);
impl_param_list!([P1 0 a1, P2 1 a2] [P2 1 a2, P1 0 a1]);
impl_param_list!([P1 0 a1, P2 1 a2, P3 2 a3] [P3 2 a3, P2 1 a2, P1 0 a1]);
impl_param_list!(
    [P1 0 a1, P2 1 a2, P3 2 a3, P4 3 a4]
    [P4 3 a4, P3 2 a3, P2 1 a2, P1 0 a1]
);
impl_param_list!(
    [P1 0 a1, P2 1 a2, P3 2 a3, P4 3 a4, P5 4 a5]
    [P5 4 a5, P4 3 a4, P3 2 a3, P2 1 a2, P1 0 a1]
);
impl_param_list!(
    [P1 0 a1, P2 1 a2, P3 2 a3, P4 3 a4, P5 4 a5, P6 5 a6]
    [P6 5 a6, P5 4 a5, P4 3 a4, P3 2 a3, P2 1 a2, P1 0 a1]
);
impl_param_list!(
    [P1 0 a1, P2 1 a2, P3 2 a3, P4 3 a4, P5 4 a5, P6 5 a6, P7 6 a7]
    [P7 6 a7, P6 5 a6, P5 4 a5, P4 3 a4, P3 2 a3, P2 1 a2, P1 0 a1]
);
impl_param_list!(
    [P1 0 a1, P2 1 a2, P3 2 a3, P4 3 a4, P5 4 a5, P6 5 a6, P7 6 a7, P8 7 a8]
    [P8 7 a8, P7 6 a7, P6 5 a6, P5 4 a5, P4 3 a4, P3 2 a3, P2 1 a2, P1 0 a1]
);
