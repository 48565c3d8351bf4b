//! Transport Layer
//!
//! The core only needs a callback: bytes in, bytes out (sync) or bytes in,
//! nothing out (async). Closures with the right shape implement both traits
//! directly. Provides:
//! - Transport / OneWayTransport: the sync and fire-and-forget contracts
//! - Loopback: in-process transport straight into a Dispatcher
//! - FramedTransport / serve: length-prefixed frames over any byte stream

pub mod framed;

use std::io;

use ipc_call_codec::{DecodeError, EncodeError};

use crate::server::{DispatchError, Dispatcher};

pub use framed::{serve, FramedTransport, ServeStats, DEFAULT_MAX_FRAME_BYTES};

/// Synchronous transport: send a request, return the reply.
pub trait Transport {
    type Error;

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

/// Fire-and-forget transport: send a request, expect no reply.
pub trait OneWayTransport {
    type Error;

    fn send(&mut self, request: &[u8]) -> Result<(), Self::Error>;
}

impl<F, E> Transport for F
where
    F: FnMut(&[u8]) -> Result<Vec<u8>, E>,
{
    type Error = E;

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>, E> {
        self(request)
    }
}

impl<F, E> OneWayTransport for F
where
    F: FnMut(&[u8]) -> Result<(), E>,
{
    type Error = E;

    fn send(&mut self, request: &[u8]) -> Result<(), E> {
        self(request)
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Connection closed by peer")]
    Closed,
}

/// In-process transport: requests go straight to a dispatcher.
///
/// Dispatch failures surface to the caller as [`TransportError::Dispatch`].
#[derive(Debug, Clone)]
pub struct Loopback {
    dispatcher: Dispatcher,
}

impl Loopback {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Transport for Loopback {
    type Error = TransportError;

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(self.dispatcher.handle_sync_request(request)?)
    }
}

impl OneWayTransport for Loopback {
    type Error = TransportError;

    fn send(&mut self, request: &[u8]) -> Result<(), TransportError> {
        Ok(self.dispatcher.handle_async_request(request)?)
    }
}
