//! Shared error type across hookwatch crates.

use thiserror::Error;

/// Stable error categories (used in logs and by callers matching on failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A metric family with the same name already exists in the registry.
    AlreadyRegistered,
    /// Invalid metric name, label name or bucket layout.
    InvalidSchema,
    /// Observation label tuple does not match the family's declared labels.
    LabelMismatch,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorKind::InvalidSchema => "INVALID_SCHEMA",
            ErrorKind::LabelMismatch => "LABEL_MISMATCH",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HookwatchError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum HookwatchError {
    #[error("metric family already registered: {0}")]
    AlreadyRegistered(String),
    #[error("invalid metric schema: {0}")]
    InvalidSchema(String),
    #[error("label arity mismatch for {family}: expected {expected} values, got {got}")]
    LabelArity {
        family: String,
        expected: usize,
        got: usize,
    },
    #[error("empty value for label {label} of {family}")]
    EmptyLabelValue { family: String, label: String },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl HookwatchError {
    /// Map the error to its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HookwatchError::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
            HookwatchError::InvalidSchema(_) => ErrorKind::InvalidSchema,
            HookwatchError::LabelArity { .. } | HookwatchError::EmptyLabelValue { .. } => {
                ErrorKind::LabelMismatch
            }
            HookwatchError::Config(_) => ErrorKind::Config,
            HookwatchError::Internal(_) => ErrorKind::Internal,
        }
    }
}
