/// Declare remotely callable functions.
///
/// Each declaration is an ordinary Rust function signature without a body.
/// For every function the macro generates an uninhabited type of the same
/// name that implements [`Signature`](crate::Signature), plus a `call`
/// constructor taking the live arguments and returning a
/// [`Call`](crate::Call).
///
/// Parameter kinds are read from the declared types: `T` is passed by
/// value, `&T` by shared reference, `&mut T` in-out. Explicit lifetimes and
/// patterns in parameter position are not supported.
///
/// The generated type lives in the type namespace only, so the server-side
/// implementation may share the function's name.
///
/// ```
/// use ipc_call::{Dispatcher, Loopback, Registry};
///
/// ipc_call::remote! {
///     /// Double a number in place and report the old value.
///     pub fn double(value: &mut u32) -> u32;
/// }
///
/// fn double(value: &mut u32) -> u32 {
///     let old = *value;
///     *value *= 2;
///     old
/// }
///
/// let mut registry = Registry::new();
/// registry.register::<double, _>(double);
/// let mut transport = Loopback::new(Dispatcher::new(registry));
///
/// let mut value = 21;
/// let old = double::call(&mut value).sync(&mut transport).unwrap();
/// assert_eq!((old, value), (21, 42));
/// ```
#[macro_export]
macro_rules! remote {
    (@params $head:tt [$($acc:tt)*]) => {
        $crate::remote!(@emit $head [$($acc)*]);
    };
    (@params $head:tt [$($acc:tt)*] $arg:ident : &mut $t:ty $(, $($rest:tt)*)?) => {
        $crate::remote!(@params $head [$($acc)* ($arg InOut $t)] $($($rest)*)?);
    };
    (@params $head:tt [$($acc:tt)*] $arg:ident : & $t:ty $(, $($rest:tt)*)?) => {
        $crate::remote!(@params $head [$($acc)* ($arg Ref $t)] $($($rest)*)?);
    };
    (@params $head:tt [$($acc:tt)*] $arg:ident : $t:ty $(, $($rest:tt)*)?) => {
        $crate::remote!(@params $head [$($acc)* ($arg Val $t)] $($($rest)*)?);
    };

    (@emit
        [$(#[$meta:meta])* $vis:vis fn $name:ident [$($ret:ty)?]]
        [$(($arg:ident $kind:ident $t:ty))*]
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types, dead_code)]
        $vis enum $name {}

        impl $crate::Signature for $name {
            const NAME: &'static str = ::core::stringify!($name);
            type Params = ($($crate::signature::$kind<$t>,)*);
            type Output = $crate::remote!(@ret $($ret)?);
        }

        impl $name {
            /// Capture live arguments for a call to this function.
            #[allow(clippy::too_many_arguments, dead_code)]
            $vis fn call<'a>(
                $($arg: <$crate::signature::$kind<$t> as $crate::signature::Param>::Arg<'a>),*
            ) -> $crate::Call<'a, $name> {
                $crate::Call::new(($($arg,)*))
            }
        }
    };

    (@ret) => { () };
    (@ret $ret:ty) => { $ret };

    () => {};
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident ( $($params:tt)* ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::remote!(@params [$(#[$meta])* $vis fn $name [$($ret)?]] [] $($params)*);
        $crate::remote!($($rest)*);
    };
}
