//! Structured logging facility for logbridge
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Everything here goes through `tracing`. The adapter never reports about
//! itself through the `log` facade, because that facade may be the very
//! emitter it is relaying to a user handler.
//!
//! # Usage
//!
//! ```rust
//! use logbridge_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
