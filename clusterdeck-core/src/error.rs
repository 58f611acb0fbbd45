//! Error types for clusterdeck
//!
//! Validation problems that belong to a single form field are *not* errors in
//! this sense: the form controller records them as [`crate::form::FieldError`]s
//! next to the field. `ClusterDeckError` covers everything that aborts an
//! operation: bad configuration, transport failures, malformed responses.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterDeckError {
    #[error("Configuration error in {component}: {message}")]
    ConfigurationError { component: String, message: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Field '{field}' is read-only in {mode} mode")]
    ReadOnlyField { field: String, mode: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("No entry at index {index} (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Transport error during '{operation}'")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Service error: {message}")]
    Service { message: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type ClusterDeckResult<T> = std::result::Result<T, ClusterDeckError>;

impl ClusterDeckError {
    /// Create a configuration error for a named component
    ///
    /// ```rust
    /// use clusterdeck_core::error::ClusterDeckError;
    ///
    /// let err = ClusterDeckError::configuration("api.endpoint", "must not be empty");
    /// assert!(err.to_string().contains("api.endpoint"));
    /// ```
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        ClusterDeckError::ConfigurationError {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClusterDeckError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClusterDeckError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap a reqwest error with the operation that was in progress
    pub fn transport(operation: impl Into<String>, source: reqwest::Error) -> Self {
        ClusterDeckError::Transport {
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ClusterDeckError::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClusterDeckError::Transport { source, .. } => {
                source.is_timeout() || source.is_connect()
            }
            ClusterDeckError::HttpStatus { status, .. } => *status >= 500,
            ClusterDeckError::IoError(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
