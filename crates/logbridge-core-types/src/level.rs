//! Log severity levels
//!
//! Levels use the Android logger numbering, which is what native hosts
//! expect to receive as the integer severity of a record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum LogLevel {
    Verbose = 2,
    Debug = 3,
    Info = 4,
    Warn = 5,
    Error = 6,
}

impl LogLevel {
    /// Integer severity as handed to native callbacks
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Lowercase name of the level
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => LogLevel::Verbose,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

/// Integer severity outside the known level range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownLevel(pub i32);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: {}", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl TryFrom<i32> for LogLevel {
    type Error = UnknownLevel;

    fn try_from(value: i32) -> Result<Self, UnknownLevel> {
        match value {
            2 => Ok(LogLevel::Verbose),
            3 => Ok(LogLevel::Debug),
            4 => Ok(LogLevel::Info),
            5 => Ok(LogLevel::Warn),
            6 => Ok(LogLevel::Error),
            other => Err(UnknownLevel(other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
