//! # Rowguard
//!
//! Typed column rules and table-level CRUD over an injected database client.
//!
//! - [`field`]: per-column coercion (type conversion, bounds, keys, defaults)
//! - [`model`]: `all` / `one` / `create` / `update` / `delete` built from those
//!   declarations, with named before/after callbacks
//! - [`report`]: errors and warnings collected during one operation
//! - [`pagination`]: limit, offset and ordering read from request arguments
//! - [`executor`]: the trait a database client implements
//!
//! With the default `tracing` feature every executor call is wrapped in a
//! `rowguard.query` span.

pub mod config;
pub mod executor;
pub mod field;
pub mod json;
pub mod model;
pub mod pagination;
pub mod report;
pub mod value;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
#[cfg(feature = "tracing")]
pub mod tracing_helpers;

pub use config::{ModelConfig, PaginationConfig};
pub use executor::{DbError, Executor};
pub use field::{CustomRule, Field, FieldError, Fields, Kind, Rule};
pub use json::JsonExport;
pub use model::{Callbacks, ErrorKind, Listing, Model, ModelError, Stage, Statement, Table};
pub use pagination::{Direction, Pagination};
pub use report::Report;
pub use value::{Params, RawMap, Record, ValueMap};
