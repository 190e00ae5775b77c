//! logbridge core - one-shot bridge from an external log emitter to a user callback
//!
//! This crate provides:
//! - `CallbackBridge`: wraps a user handler so the emitter can call it from any
//!   thread without ever seeing a handler error or panic
//! - `LogAdapter`: the enable / disable state machine that owns at most one
//!   live bridge registration for the lifetime of the process
//! - `LogSink`: the seam to the external emitter, with a `log` facade sink and
//!   a direct in-process sink
//! - Error and structured logging facilities shared by the above

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod sink;

pub use logbridge_core_types::schema;
pub use logbridge_core_types::{LogLevel, LogRecord, RegistrationId};

// Re-export commonly used types
pub use adapter::{AdapterPhase, LogAdapter};
pub use bridge::{CallbackBridge, HandlerFailure, HandlerResult, LogHandler};
pub use config::FacadeConfig;
pub use errors::{AdapterError, ExError, ExErrorKind, Result, SinkError};
pub use sink::{DirectSink, FacadeSink, LogSink};
