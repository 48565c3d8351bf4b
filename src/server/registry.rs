//! Name-keyed function registry.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use ipc_call_codec::{DecodeError, Decoder, EncodeError, Encoder};
use tracing::{debug, warn};

use super::dispatcher::DispatchError;
use super::handler::Handler;
use crate::signature::{CallDescriptor, ParamList, Signature};

/// A registered function with its signature erased.
///
/// Each implementation decodes requests against its own signature, so the
/// registry can store functions of every shape side by side.
pub trait RemoteFunction: Send + Sync {
    fn descriptor(&self) -> &CallDescriptor;

    /// Decode the arguments, invoke, and encode the response envelope.
    ///
    /// `decoder` is positioned just past the function name and must be
    /// consumed exactly; nothing is invoked if it is not.
    fn call_sync(&self, decoder: &mut Decoder<'_>) -> Result<Vec<u8>, DispatchError>;

    /// Decode the arguments and invoke, discarding the return value and
    /// every output.
    fn call_async(&self, decoder: &mut Decoder<'_>) -> Result<(), DispatchError>;
}

struct Registered<S, F> {
    handler: F,
    descriptor: CallDescriptor,
    _signature: PhantomData<fn() -> S>,
}

type Holders<S> = (
    <<S as Signature>::Params as ParamList>::Owned,
    <<S as Signature>::Params as ParamList>::Slots,
);

impl<S, F> Registered<S, F>
where
    S: Signature,
    F: Handler<S::Params, S::Output>,
{
    fn decode(&self, decoder: &mut Decoder<'_>) -> Result<Holders<S>, DispatchError> {
        S::Params::decode_holders(decoder)
            .and_then(|holders| decoder.finish().map(|()| holders))
            .map_err(|source| self.malformed(source))
    }

    fn encode_response(
        output: &S::Output,
        slots: &<S::Params as ParamList>::Slots,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new();
        encoder.put(output)?;
        S::Params::encode_outputs(slots, &mut encoder)?;
        Ok(encoder.into_bytes())
    }

    fn malformed(&self, source: DecodeError) -> DispatchError {
        let name = &self.descriptor.name;
        warn!(function = %name, error = %source, "malformed call arguments");
        DispatchError::MalformedPayload {
            name: name.clone(),
            source,
        }
    }
}

impl<S, F> RemoteFunction for Registered<S, F>
where
    S: Signature,
    F: Handler<S::Params, S::Output>,
{
    fn descriptor(&self) -> &CallDescriptor {
        &self.descriptor
    }

    fn call_sync(&self, decoder: &mut Decoder<'_>) -> Result<Vec<u8>, DispatchError> {
        let (owned, mut slots) = self.decode(decoder)?;
        let output = self.handler.invoke(owned, &mut slots);

        Self::encode_response(&output, &slots).map_err(|source| {
            warn!(function = %self.descriptor.name, error = %source, "response not encodable");
            DispatchError::EncodeResponse {
                name: self.descriptor.name.clone(),
                source,
            }
        })
    }

    fn call_async(&self, decoder: &mut Decoder<'_>) -> Result<(), DispatchError> {
        let (owned, mut slots) = self.decode(decoder)?;
        let _ = self.handler.invoke(owned, &mut slots);
        Ok(())
    }
}

/// Function name → type-erased function.
///
/// Populated during startup, then handed to a
/// [`Dispatcher`](crate::Dispatcher). Registering a name twice replaces the
/// earlier function.
#[derive(Default)]
pub struct Registry {
    functions: HashMap<String, Box<dyn RemoteFunction>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under the signature's declared name.
    ///
    /// Returns `false` if a function of that name was replaced.
    pub fn register<S, F>(&mut self, handler: F) -> bool
    where
        S: Signature,
        F: Handler<S::Params, S::Output>,
    {
        self.register_as::<S, F>(S::NAME, handler)
    }

    /// Register `handler` under an explicit wire name.
    ///
    /// Returns `false` if a function of that name was replaced.
    pub fn register_as<S, F>(&mut self, name: &str, handler: F) -> bool
    where
        S: Signature,
        F: Handler<S::Params, S::Output>,
    {
        let descriptor = CallDescriptor::named::<S>(name);
        debug!(function = %descriptor, "registering function");

        let function = Registered::<S, F> {
            handler,
            descriptor,
            _signature: PhantomData,
        };
        let replaced = self
            .functions
            .insert(name.to_string(), Box::new(function))
            .is_some();

        if replaced {
            warn!(function = name, "replaced previously registered function");
        }
        !replaced
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn RemoteFunction> {
        self.functions.get(name).map(|function| function.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors of every registered function, sorted by name.
    pub fn descriptors(&self) -> Vec<&CallDescriptor> {
        let mut descriptors: Vec<&CallDescriptor> =
            self.functions.values().map(|f| f.descriptor()).collect();
        descriptors.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}
