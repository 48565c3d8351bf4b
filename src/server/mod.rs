//! Server side: function registry and request dispatch.
//!
//! Populate a [`Registry`] during startup, then freeze it into a
//! [`Dispatcher`] and hand the dispatcher to the server-side transport. The
//! registry is read-only from then on, so lookups need no locking.

mod dispatcher;
mod handler;
mod registry;

pub use dispatcher::{DispatchError, Dispatcher};
pub use handler::Handler;
pub use registry::{Registry, RemoteFunction};
