//! Canonical schema constants for structured logging and events
//!
//! These constants keep adapter lifecycle events consistent across the
//! core crate, its tests and the CLI.

// Canonical field keys for structured logging
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_REGISTRATION_ID: &str = "registration_id";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Adapter operations
pub const OP_ENABLE: &str = "log_adapter.enable";
pub const OP_TRY_ENABLE: &str = "log_adapter.try_enable";
pub const OP_DISABLE: &str = "log_adapter.disable";
