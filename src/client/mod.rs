//! Client Proxy
//!
//! Turns a function name plus live arguments into a request envelope, hands
//! it to a transport, and decodes the response back into the return value
//! and the caller's `&mut` arguments.
//!
//! Request:  `name, arg_1 .. arg_n` (declaration order, every argument)
//! Response: `return_value, out_n .. out_1` (outputs in reverse order)

use std::borrow::Cow;

use ipc_call_codec::{DecodeError, Decoder, EncodeError, Encoder};
use tracing::debug;

use crate::signature::{InputOnly, ParamList, Signature};
use crate::transport::{OneWayTransport, Transport};

/// A pending call to the function described by `S`.
///
/// Holds the caller's arguments (including `&mut` borrows) until the call
/// is sent. Nothing goes over the wire until [`sync`](Call::sync) or
/// [`post`](Call::post) is invoked.
pub struct Call<'a, S: Signature> {
    name: Cow<'static, str>,
    args: <S::Params as ParamList>::Args<'a>,
}

impl<'a, S: Signature> Call<'a, S> {
    /// Capture an argument tuple. `S::call(..)` from
    /// [`remote!`](crate::remote) is the usual way in.
    pub fn new(args: <S::Params as ParamList>::Args<'a>) -> Self {
        Self {
            name: Cow::Borrowed(S::NAME),
            args,
        }
    }

    /// Send under a different wire name, matching a server that registered
    /// the function with [`Registry::register_as`](crate::Registry::register_as).
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode the request envelope.
    pub fn request(&self) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new();
        encoder.put(&*self.name)?;
        S::Params::encode_args(&self.args, &mut encoder)?;
        Ok(encoder.into_bytes())
    }

    /// Call and wait for the response.
    ///
    /// Returns the function's return value; every `&mut` argument holds its
    /// post-call value afterwards. Transport errors come back unchanged. A
    /// response that is short or has bytes left over is a decode error, and
    /// no argument is touched: outputs are written back only once the whole
    /// response has decoded.
    pub fn sync<T>(mut self, transport: &mut T) -> Result<S::Output, T::Error>
    where
        T: Transport + ?Sized,
        T::Error: From<EncodeError> + From<DecodeError>,
    {
        let request = self.request()?;
        debug!(function = %self.name, request_bytes = request.len(), "sending sync call");

        let response = transport.round_trip(&request)?;
        debug!(function = %self.name, response_bytes = response.len(), "received response");

        let mut decoder = Decoder::new(&response);
        let output = decoder.take::<S::Output>()?;
        let outputs = S::Params::decode_outputs(&mut decoder)?;
        decoder.finish()?;

        S::Params::restore_outputs(&mut self.args, outputs);
        Ok(output)
    }

    /// Send without waiting for a reply.
    ///
    /// Returns once the transport has accepted the request; failures after
    /// that point are invisible to the caller. Only available when the
    /// signature has no `&mut` parameter:
    ///
    /// ```compile_fail
    /// ipc_call::remote! {
    ///     fn bump(counter: &mut u32);
    /// }
    ///
    /// let mut sink = |_: &[u8]| -> Result<(), ipc_call::TransportError> { Ok(()) };
    /// let mut counter = 0;
    /// bump::call(&mut counter).post(&mut sink).unwrap();
    /// ```
    pub fn post<T>(self, transport: &mut T) -> Result<(), T::Error>
    where
        T: OneWayTransport + ?Sized,
        T::Error: From<EncodeError>,
        S::Params: InputOnly,
    {
        let request = self.request()?;
        debug!(function = %self.name, request_bytes = request.len(), "posting async call");
        transport.send(&request)
    }
}
