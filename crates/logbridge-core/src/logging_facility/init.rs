//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::str::FromStr;
use std::sync::Once;
use tracing::subscriber::set_global_default;
use tracing_subscriber::EnvFilter;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Bare registry; tests install their own capture layer
    Test,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" | "development" => Ok(Profile::Development),
            "prod" | "production" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown logging profile: {}", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Installs the process-wide tracing subscriber for the selected profile.
/// Only the first call has an effect; a subscriber installed by someone
/// else is left in place.
///
/// # Profiles
///
/// - **Development**: Human-readable logs, `logbridge=debug` unless `RUST_LOG` is set
/// - **Production**: JSON structured logs, `logbridge=info` unless `RUST_LOG` is set
/// - **Test**: No output
///
/// Output goes to stderr; stdout belongs to whatever the relayed handler prints.
///
/// Only the tracing dispatcher is set. The process-wide `log` logger is left
/// free for `FacadeSink`.
///
/// # Example
///
/// ```
/// use logbridge_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let _ = match profile {
            Profile::Development => set_global_default(
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new("logbridge=debug")),
                    )
                    .finish(),
            ),
            Profile::Production => set_global_default(
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new("logbridge=info")),
                    )
                    .finish(),
            ),
            Profile::Test => set_global_default(tracing_subscriber::registry()),
        };
    });
}
