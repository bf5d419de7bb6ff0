//! Error types for Model operations.
//!
//! This module provides the `ModelError` enum returned by every public
//! [`Model`](super::Model) operation.

use super::callbacks::CallbackError;
use crate::executor::DbError;

/// Outcome kind of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// One or more columns failed validation; see the model's report
    Fields,
    /// Structural problem or database failure
    Error,
    /// A callback failed
    Callback,
}

/// Error type for Model operations
#[derive(Debug)]
pub enum ModelError {
    /// Field-level failures; the report's field errors hold the detail
    Fields(String),
    /// Structural problem (empty statement, missing primary key, ...)
    Error(String),
    /// The executor failed; the message is fixed per operation
    Database { message: String, source: DbError },
    /// Error returned by a before/after callback, unchanged
    Callback(CallbackError),
}

impl ModelError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Fields(_) => ErrorKind::Fields,
            ModelError::Error(_) | ModelError::Database { .. } => ErrorKind::Error,
            ModelError::Callback(_) => ErrorKind::Callback,
        }
    }

    /// The operation-level message, e.g. `"Missing required fields"`
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ModelError::Fields(msg) | ModelError::Error(msg) => msg.clone(),
            ModelError::Database { message, .. } => message.clone(),
            ModelError::Callback(err) => err.to_string(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Fields(msg) => write!(f, "{msg}"),
            ModelError::Error(msg) => write!(f, "{msg}"),
            ModelError::Database { message, .. } => write!(f, "{message}"),
            ModelError::Callback(err) => write!(f, "Callback error: {err}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Database { source, .. } => Some(source),
            ModelError::Callback(err) => Some(&**err),
            ModelError::Fields(_) | ModelError::Error(_) => None,
        }
    }
}
