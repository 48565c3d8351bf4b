//! IPC Call - typed remote function calls over any byte transport
//!
//! A function is declared once with [`remote!`]. The client captures live
//! arguments, serializes them in declaration order, and hands the bytes to a
//! transport. The server looks the function up by name, rebuilds each
//! argument, invokes it, and sends back the return value followed by every
//! `&mut` argument in reverse order. The client then writes those values
//! back into the caller's variables.
//!
//! Modules:
//! - signature: parameter classification and call descriptors
//! - client: the `Call` proxy
//! - server: registry and dispatcher
//! - transport: transport contracts, loopback, framed byte streams
//! - config / logging: server configuration and diagnostics
//! - demo: built-in example functions

pub mod client;
pub mod config;
pub mod demo;
pub mod logging;
pub mod server;
pub mod signature;
pub mod transport;

pub use ipc_call_codec as codec;
pub use ipc_call_codec::{Decode, DecodeError, Decoder, Encode, EncodeError, Encoder};

pub use client::Call;
pub use config::{Config, ConfigError, LogConfig, LogFormat};
pub use server::{DispatchError, Dispatcher, Handler, Registry, RemoteFunction};
pub use signature::{CallDescriptor, Direction, ParamKind, Signature};
pub use transport::{FramedTransport, Loopback, OneWayTransport, Transport, TransportError};
