use crate::adapter::AdapterPhase;
use logbridge_core_types::RegistrationId;
use thiserror::Error;

/// Result type alias using AdapterError
pub type Result<T> = std::result::Result<T, AdapterError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code used in structured log events and by
/// callers that branch on failures programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Enablement already happened in this process (live or disabled)
    AlreadyEnabled,
    /// The external sink refused or failed the registration
    Registration,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::AlreadyEnabled => "ERR_ALREADY_ENABLED",
            ExErrorKind::Registration => "ERR_REGISTRATION",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    registration_id: Option<RegistrationId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            registration_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add registration context
    pub fn with_registration_id(mut self, id: RegistrationId) -> Self {
        self.registration_id = Some(id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn registration_id(&self) -> Option<&RegistrationId> {
        self.registration_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(id) = &self.registration_id {
            write!(f, " (registration_id: {})", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Errors returned by the adapter's enable operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Enablement is one-shot: the adapter is live or has been disabled
    #[error("Log adapter cannot be enabled: already {phase}")]
    AlreadyEnabled { phase: AdapterPhase },

    /// The external sink failed to register the bridge
    #[error("Log sink registration failed: {message}")]
    Registration { message: String },
}

impl From<SinkError> for AdapterError {
    fn from(err: SinkError) -> Self {
        AdapterError::Registration {
            message: err.to_string(),
        }
    }
}

impl From<AdapterError> for ExError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::AlreadyEnabled { phase } => ExError::new(ExErrorKind::AlreadyEnabled)
                .with_message(format!("Adapter is {}", phase)),
            AdapterError::Registration { message } => {
                ExError::new(ExErrorKind::Registration).with_message(message)
            }
        }
    }
}

/// Failures reported by an external sink during registration
#[derive(Error, Debug)]
pub enum SinkError {
    /// The `log` facade accepts one logger per process
    #[error("a global logger is already installed")]
    LoggerAlreadyInstalled,

    /// The sink already serves another bridge
    #[error("sink already has a registered bridge")]
    Occupied,

    #[error("failed to spawn dispatcher thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("registration rejected: {reason}")]
    Rejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::AlreadyEnabled, "ERR_ALREADY_ENABLED"),
            (ExErrorKind::Registration, "ERR_REGISTRATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_sink_error_becomes_registration_error() {
        let err: AdapterError = SinkError::Rejected {
            reason: "emitter offline".to_string(),
        }
        .into();
        assert_eq!(
            err,
            AdapterError::Registration {
                message: "registration rejected: emitter offline".to_string()
            }
        );
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::Registration)
            .with_op("log_adapter.enable")
            .with_message("a global logger is already installed")
            .with_registration_id(RegistrationId::from_string("reg-7".to_string()));
        assert_eq!(
            err.to_string(),
            "[ERR_REGISTRATION] in operation 'log_adapter.enable': a global logger is already installed (registration_id: reg-7)"
        );
    }

    #[test]
    fn test_already_enabled_conversion() {
        let ex: ExError = AdapterError::AlreadyEnabled {
            phase: AdapterPhase::Disabled,
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::AlreadyEnabled);
        assert_eq!(ex.message(), "Adapter is disabled");
        assert!(ex.registration_id().is_none());
    }
}
