//! Transient log records
//!
//! A record is produced by the external emitter, consumed once by the
//! callback bridge and then discarded.

use crate::level::LogLevel;
use serde::{Deserialize, Serialize};

/// A single log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub tag: Option<String>,
    pub message: String,
}

impl LogRecord {
    /// Create a record
    pub fn new(level: LogLevel, tag: Option<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            tag,
            message: message.into(),
        }
    }

    /// Get the tag, if any
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Get the message
    pub fn message(&self) -> &str {
        &self.message
    }
}
