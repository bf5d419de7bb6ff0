//! Error types for field declaration and value coercion.
//!
//! This module provides the `FieldError` enum. Its `Display` output is the
//! reason string recorded in a [`Report`](crate::report::Report) when a column
//! fails to coerce.

use std::fmt;

/// Error raised while declaring a [`Field`](super::Field) or coercing a value through it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Value was absent, the field is not-null and declares no default
    InvalidDefault,
    /// Explicit null given to a not-null field
    NullNotAuthorized,
    /// Non-numeric input for an `int` column
    InvalidInt,
    /// Non-numeric input for a `float` column
    InvalidFloat,
    /// Primary or foreign key below 1
    InvalidKey,
    /// Input that cannot be cast to a string
    InvalidString,
    /// String shorter than the declared minimum length
    InvalidMinLength,
    InvalidDate,
    InvalidDatetime,
    InvalidTime,
    InvalidTimestamp,
    InvalidYear,
    /// Value not among the declared enum members
    InvalidEnum,
    InvalidEmail,
    /// Unknown column type name at declaration time
    UnknownKind(String),
    /// Unknown or malformed rule token at declaration time
    UnknownRule(String),
    /// Failure reported by a caller-supplied rule
    Custom(String),
}

impl FieldError {
    /// Build a `Custom` error from any message
    pub fn custom(message: impl Into<String>) -> Self {
        FieldError::Custom(message.into())
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidDefault => write!(f, "Invalid default value"),
            FieldError::NullNotAuthorized => write!(f, "Null not authorized"),
            FieldError::InvalidInt => write!(f, "Invalid int value"),
            FieldError::InvalidFloat => write!(f, "Invalid float value"),
            FieldError::InvalidKey => write!(f, "Invalid key value"),
            FieldError::InvalidString => write!(f, "Invalid string value"),
            FieldError::InvalidMinLength => write!(f, "Invalid min length"),
            FieldError::InvalidDate => write!(f, "Invalid date value"),
            FieldError::InvalidDatetime => write!(f, "Invalid datetime value"),
            FieldError::InvalidTime => write!(f, "Invalid time value"),
            FieldError::InvalidTimestamp => write!(f, "Invalid timestamp value"),
            FieldError::InvalidYear => write!(f, "Invalid year value"),
            FieldError::InvalidEnum => write!(f, "Invalid enum value"),
            FieldError::InvalidEmail => write!(f, "Invalid email value"),
            FieldError::UnknownKind(kind) => write!(f, "Unknown field type: {kind}"),
            FieldError::UnknownRule(rule) => write!(f, "Unknown rule: {rule}"),
            FieldError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_report_reasons() {
        assert_eq!(FieldError::InvalidDefault.to_string(), "Invalid default value");
        assert_eq!(FieldError::NullNotAuthorized.to_string(), "Null not authorized");
        assert_eq!(FieldError::InvalidMinLength.to_string(), "Invalid min length");
        assert_eq!(FieldError::custom("too loud").to_string(), "too loud");
    }

    #[test]
    fn test_declaration_errors_name_the_token() {
        let err = FieldError::UnknownRule("shiny".to_string());
        assert!(err.to_string().contains("shiny"));
        let err = FieldError::UnknownKind("blob".to_string());
        assert!(err.to_string().contains("blob"));
    }
}
