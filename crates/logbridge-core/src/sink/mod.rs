//! External log sink interface
//!
//! A sink is the emitter side of the bridge: it accepts one bridge per
//! registration, calls it from threads of its choosing, and on unregister
//! blocks until it will never call that bridge again.

pub mod direct;
pub mod facade;

pub use direct::{DirectHandle, DirectSink};
pub use facade::{FacadeHandle, FacadeSink};

use crate::bridge::CallbackBridge;
use crate::errors::SinkError;
use std::sync::Arc;

/// The external emitter's registration interface
pub trait LogSink: Send + Sync {
    /// Token identifying one registration; consumed by `unregister`
    type Handle: Send;

    /// Install `bridge` as the receiver of records
    ///
    /// The sink may invoke the bridge before this returns, on any thread.
    ///
    /// # Errors
    ///
    /// Returns a `SinkError` when the emitter cannot accept the bridge. The
    /// sink must not keep any reference to the bridge in that case.
    fn register(&self, bridge: Arc<CallbackBridge>) -> Result<Self::Handle, SinkError>;

    /// Remove a registration
    ///
    /// Blocks until no invocation of the registered bridge is running or
    /// can start. There is no timeout.
    fn unregister(&self, handle: Self::Handle);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    type Handle = S::Handle;

    fn register(&self, bridge: Arc<CallbackBridge>) -> Result<Self::Handle, SinkError> {
        (**self).register(bridge)
    }

    fn unregister(&self, handle: Self::Handle) {
        (**self).unregister(handle)
    }
}
