//! Core types shared across the logbridge crates
//!
//! This crate provides the value types that travel between the external
//! log emitter, the callback bridge and the adapter:
//!
//! - **Levels and records**: LogLevel, LogRecord
//! - **Registration identity**: RegistrationId for correlating lifecycle events
//! - **Schema constants**: Canonical field keys, event and operation names

pub mod level;
pub mod record;
pub mod registration;
pub mod schema;

pub use level::{LogLevel, UnknownLevel};
pub use record::LogRecord;
pub use registration::RegistrationId;
