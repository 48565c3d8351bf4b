//! Invoking concrete functions against decoded arguments.

use crate::signature::{Param, ParamList};

/// A function callable with the arguments described by `P`, returning `R`.
///
/// Implemented for every `Fn` whose parameter types are the `Arg`s of `P`,
/// for arities 0 to 8: `fn(i32, &String, &mut Vec<u8>) -> bool` handles
/// `(Val<i32>, Ref<String>, InOut<Vec<u8>>)`.
pub trait Handler<P: ParamList, R>: Send + Sync + 'static {
    /// Call with by-value arguments moved in and every reference argument
    /// borrowed from `slots`.
    fn invoke(&self, owned: P::Owned, slots: &mut P::Slots) -> R;
}

impl<F, R> Handler<(), R> for F
where
    F: Fn() -> R + Send + Sync + 'static,
{
    fn invoke(&self, _owned: (), _slots: &mut ()) -> R {
        (self)()
    }
}

macro_rules! impl_handler {
    ($($P:ident $idx:tt),+) => {
        impl<F, R, $($P: Param),+> Handler<($($P,)+), R> for F
        where
            F: for<'a> Fn($($P::Arg<'a>),+) -> R + Send + Sync + 'static,
        {
            fn invoke(
                &self,
                owned: <($($P,)+) as ParamList>::Owned,
                slots: &mut <($($P,)+) as ParamList>::Slots,
            ) -> R {
                (self)($($P::lend(owned.$idx, &mut slots.$idx)),+)
            }
        }
    };
}

impl_handler!(P1 0);
impl_handler!(P1 0, P2 1);
impl_handler!(P1 0, P2 1, P3 2);
impl_handler!(P1 0, P2 1, P3 2, P4 3);
impl_handler!(P1 0, P2 1, P3 2, P4 3, P5 4);
impl_handler!(P1 0, P2 1, P3 2, P4 3, P5 4, P6 5);
impl_handler!(P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6);
impl_handler!(P1 0, P2 1, P3 2, P4 3, P5 4, P6 5, P7 6, P8 7);
