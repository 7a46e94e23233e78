//! Error types module
//!
//! All fallible operations of the engine report a `FormError`. Degradations
//! that are part of normal operation (an unrecognized validation expression,
//! a missing locale block, an unknown field type) are never errors; only
//! structurally broken input and rejected state changes end up here.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like invalid user input
    Debug,
    /// Warning level - for caller contract violations
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error for hosts that surface failures to users.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "MALFORMED_SCHEMA")
    fn error_code(&self) -> &'static str;

    /// Whether retrying with different input can succeed
    fn is_recoverable(&self) -> bool;

    /// Message suitable for display by the host
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid upload transition: cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("Invalid upload progress: {sent}/{total}")]
    InvalidProgress { sent: i64, total: i64 },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type FormResult<T> = Result<T, FormError>;

impl From<quick_xml::Error> for FormError {
    fn from(err: quick_xml::Error) -> Self {
        FormError::MalformedSchema(err.to_string())
    }
}

impl From<io::Error> for FormError {
    fn from(err: io::Error) -> Self {
        FormError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::Deserialization(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn form_error_static_metadata(err: &FormError) -> (&'static str, bool, LogLevel) {
    match err {
        FormError::MalformedSchema(_) => ("MALFORMED_SCHEMA", false, LogLevel::Warn),
        FormError::Deserialization(_) => ("DESERIALIZATION_ERROR", false, LogLevel::Warn),
        FormError::InvalidTransition { .. } => ("INVALID_TRANSITION", false, LogLevel::Warn),
        FormError::InvalidProgress { .. } => ("INVALID_PROGRESS", false, LogLevel::Warn),
        FormError::InvalidValue { .. } => ("INVALID_VALUE", true, LogLevel::Debug),
        FormError::Io(_) => ("IO_ERROR", true, LogLevel::Error),
        FormError::Config(_) => ("CONFIG_ERROR", false, LogLevel::Error),
    }
}

impl FormError {
    pub(crate) fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl ErrorMetadata for FormError {
    fn error_code(&self) -> &'static str {
        form_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        form_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        form_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            FormError::MalformedSchema(_) => "The form definition could not be read".to_string(),
            FormError::Deserialization(_) => "The stored value could not be read".to_string(),
            FormError::InvalidTransition { .. } | FormError::InvalidProgress { .. } => {
                "The upload is in an unexpected state".to_string()
            }
            FormError::InvalidValue { field, reason } => format!("{}: {}", field, reason),
            FormError::Io(_) => "The selected file could not be read".to_string(),
            FormError::Config(_) => "The engine is misconfigured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_malformed_schema() {
        let err = FormError::MalformedSchema("no root element".to_string());
        assert_eq!(err.error_code(), "MALFORMED_SCHEMA");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert_eq!(err.client_message(), "The form definition could not be read");
    }

    #[test]
    fn test_error_metadata_invalid_value() {
        let err = FormError::invalid_value("Age", "not a number");
        assert_eq!(err.error_code(), "INVALID_VALUE");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Age: not a number");
        assert_eq!(err.to_string(), "Invalid value for field 'Age': not a number");
    }

    #[test]
    fn test_transition_error_display() {
        let err = FormError::InvalidTransition {
            from: "uploaded",
            action: "report progress",
        };
        assert_eq!(
            err.to_string(),
            "Invalid upload transition: cannot report progress while uploaded"
        );
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FormError::from(json_err);
        assert_eq!(err.error_code(), "DESERIALIZATION_ERROR");
    }
}
