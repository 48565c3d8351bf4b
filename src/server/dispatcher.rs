//! Request dispatcher.
//!
//! Routes an incoming request to the registered function named in its
//! header and produces the response envelope.

use std::sync::Arc;

use ipc_call_codec::{DecodeError, Decoder, EncodeError};
use tracing::{debug, warn};

use super::registry::{Registry, RemoteFunction};

/// Dispatch errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("IPC function '{name}' is not registered")]
    NotRegistered { name: String },

    #[error("malformed request header: {0}")]
    MalformedHeader(#[source] DecodeError),

    #[error("malformed arguments for '{name}': {source}")]
    MalformedPayload {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("cannot encode response of '{name}': {source}")]
    EncodeResponse {
        name: String,
        #[source]
        source: EncodeError,
    },
}

/// Read-only view of a [`Registry`] that serves requests.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Serve a synchronous request, returning the response envelope:
    /// the encoded return value followed by every output in reverse
    /// declaration order.
    pub fn handle_sync_request(&self, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let mut decoder = Decoder::new(request);
        let (name, function) = self.resolve(&mut decoder)?;

        let response = function.call_sync(&mut decoder)?;

        debug!(function = %name, response_len = response.len(), "sync call served");
        Ok(response)
    }

    /// Serve an asynchronous request. The return value and outputs are
    /// discarded.
    pub fn handle_async_request(&self, request: &[u8]) -> Result<(), DispatchError> {
        let mut decoder = Decoder::new(request);
        let (name, function) = self.resolve(&mut decoder)?;

        function.call_async(&mut decoder)?;

        debug!(function = %name, "async call served");
        Ok(())
    }

    fn resolve(
        &self,
        decoder: &mut Decoder<'_>,
    ) -> Result<(String, &dyn RemoteFunction), DispatchError> {
        let name: String = decoder.take().map_err(DispatchError::MalformedHeader)?;

        match self.registry.lookup(&name) {
            Some(function) => Ok((name, function)),
            None => {
                warn!(function = %name, "call to unregistered function");
                Err(DispatchError::NotRegistered { name })
            }
        }
    }
}
