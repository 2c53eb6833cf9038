//! Structured error types for the dashboard surfaces.

use serde::Serialize;
use std::collections::BTreeMap;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidFieldValue,

    // Not found errors
    TaskNotFound,
    UserNotFound,

    // Loading errors
    SnapshotLoad,
    ConfigError,

    InternalError,
}

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Errors raised by the session, loaders, validation and the HTTP API.
///
/// The filter engine itself never fails; these cover everything around it.
#[derive(Debug, thiserror::Error)]
pub enum TaskboardError {
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    #[error("Failed to load snapshot {path}: {reason}")]
    SnapshotLoad { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl TaskboardError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn snapshot(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::SnapshotLoad {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound(_) => ErrorCode::TaskNotFound,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::InvalidValue { .. } => ErrorCode::InvalidFieldValue,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::SnapshotLoad { .. } => ErrorCode::SnapshotLoad,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Serializable body for API responses and plain display.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            field: match self {
                Self::InvalidValue { field, .. } => Some(field.clone()),
                _ => None,
            },
            fields: match self {
                Self::Validation(fields) => Some(fields.clone()),
                _ => None,
            },
        }
    }
}

/// Wire form of an error.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, TaskboardError>;
