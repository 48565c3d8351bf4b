//! Parameter classification and call descriptors.
//!
//! A function's wire contract is fixed by its declaration: each parameter is
//! classified structurally from its declared type, and the ordered list of
//! classifications plus the return type make up the signature that both the
//! client proxy and the dispatcher follow.
//!
//! | declared type | kind     | direction | request | response |
//! |---------------|----------|-----------|---------|----------|
//! | `T`           | `Value`  | in        | yes     | no       |
//! | `&T`          | `Ref`    | in        | yes     | no       |
//! | `&mut T`      | `RefMut` | in-out    | yes     | yes      |
//!
//! A mutable reference is always in-out: the callee's intent cannot be read
//! from the type, so the current value is sent and the final value returned.
//!
//! Client and server must be built from the same declaration. Nothing on
//! the wire identifies parameter types, so a mismatch decodes garbage rather
//! than failing cleanly.

mod descriptor;
mod list;
mod macros;
mod param;

use ipc_call_codec::{Decode, Encode};

pub use descriptor::{CallDescriptor, ParamDescriptor};
pub use list::{InputOnly, ParamList};
pub use param::{Direction, InOut, InputParam, Param, ParamKind, Ref, Val};

/// Compile-time description of one remotely callable function.
///
/// Normally generated by [`remote!`](crate::remote) rather than written by
/// hand.
pub trait Signature: 'static {
    /// Default wire name.
    const NAME: &'static str;

    /// Parameter kinds in declaration order.
    type Params: ParamList;

    /// Return type; `()` for functions that return nothing, which encodes
    /// to zero bytes.
    type Output: Encode + Decode + 'static;
}
