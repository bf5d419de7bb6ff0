//! `Executor` Module
//!
//! Provides the `Executor` trait that abstracts the database client a
//! [`Model`](crate::model::Model) runs its statements through.
//!
//! Statements use named `:column` placeholders and arrive together with their
//! ordered [`Params`]. Translating those into the driver's own binding style
//! (`$1`, `?`, ...) is the implementation's job.

use crate::value::{Params, RawMap};
use std::fmt;

/// Executor error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Error reported by the database driver, with its provider code when known
    Driver { code: Option<String>, message: String },
    /// Query execution error
    QueryError(String),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Driver {
                code: Some(code),
                message,
            } => write!(f, "Database error [{code}]: {message}"),
            DbError::Driver { code: None, message } => write!(f, "Database error: {message}"),
            DbError::QueryError(s) => write!(f, "Query error: {s}"),
            DbError::ParseError(s) => write!(f, "Parse error: {s}"),
            DbError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for DbError {}

/// Trait for executing database operations
///
/// Implementations wrap a real client (a direct connection, a pooled one, a
/// transaction) or a test double. Every method is blocking; a `Model` issues at
/// most one call per step of an operation and never overlaps them.
///
/// Failures are returned as [`DbError`]. Implementations that keep a history of
/// provider errors expose it through [`Executor::errors`] and
/// [`Executor::last_error`]; a `Model` only reports a fixed message and leaves
/// the detail here.
///
/// # Examples
///
/// ```no_run
/// use rowguard::executor::{DbError, Executor};
/// use rowguard::value::{Params, RawMap};
///
/// struct Offline;
///
/// impl Executor for Offline {
///     fn query_one(&self, _: &str, _: &Params) -> Result<Option<RawMap>, DbError> {
///         Err(DbError::Other("offline".into()))
///     }
///     fn query_all(&self, _: &str, _: &Params) -> Result<Vec<RawMap>, DbError> {
///         Err(DbError::Other("offline".into()))
///     }
///     fn count(&self, _: &str, _: &Params) -> Result<u64, DbError> {
///         Err(DbError::Other("offline".into()))
///     }
///     fn insert(&self, _: &str, _: &Params) -> Result<i64, DbError> {
///         Err(DbError::Other("offline".into()))
///     }
///     fn execute(&self, _: &str, _: &Params) -> Result<u64, DbError> {
///         Err(DbError::Other("offline".into()))
///     }
/// }
/// ```
pub trait Executor {
    /// Run a query expected to return at most one row
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn query_one(&self, sql: &str, params: &Params) -> Result<Option<RawMap>, DbError>;

    /// Run a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn query_all(&self, sql: &str, params: &Params) -> Result<Vec<RawMap>, DbError>;

    /// Run a `SELECT count(*)` style query and return the count
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn count(&self, sql: &str, params: &Params) -> Result<u64, DbError>;

    /// Run an INSERT and return the generated id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn insert(&self, sql: &str, params: &Params) -> Result<i64, DbError>;

    /// Execute a statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn execute(&self, sql: &str, params: &Params) -> Result<u64, DbError>;

    /// Run an UPDATE; defaults to [`Executor::execute`]
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn update(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        self.execute(sql, params)
    }

    /// Run a DELETE; defaults to [`Executor::execute`]
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query execution fails.
    fn delete(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        self.execute(sql, params)
    }

    /// Errors recorded by the underlying client, oldest first
    fn errors(&self) -> Vec<DbError> {
        Vec::new()
    }

    /// Most recent error recorded by the underlying client
    fn last_error(&self) -> Option<DbError> {
        self.errors().pop()
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn query_one(&self, sql: &str, params: &Params) -> Result<Option<RawMap>, DbError> {
        (**self).query_one(sql, params)
    }

    fn query_all(&self, sql: &str, params: &Params) -> Result<Vec<RawMap>, DbError> {
        (**self).query_all(sql, params)
    }

    fn count(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        (**self).count(sql, params)
    }

    fn insert(&self, sql: &str, params: &Params) -> Result<i64, DbError> {
        (**self).insert(sql, params)
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        (**self).execute(sql, params)
    }

    fn update(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        (**self).update(sql, params)
    }

    fn delete(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        (**self).delete(sql, params)
    }

    fn errors(&self) -> Vec<DbError> {
        (**self).errors()
    }

    fn last_error(&self) -> Option<DbError> {
        (**self).last_error()
    }
}
