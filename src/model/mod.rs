//! Table-level CRUD built from field declarations.
//!
//! A [`Table`] names its table and declares its [`Fields`]. A [`Model`] pairs
//! a table with an [`Executor`] and offers `all`, `one`, `create`, `update`
//! and `delete`. Every operation:
//!
//! - resets the model's [`Report`]
//! - coerces incoming values through their fields, collecting every failure
//!   before giving up with [`ModelError::Fields`]
//! - assembles SQL with named `:column` placeholders
//! - runs the [`Callbacks`] registered for the operation (create, update and
//!   delete only)
//! - wraps executor failures in [`ModelError::Database`] with a fixed message
//!
//! # Example
//!
//! ```no_run
//! use rowguard::field::{Field, FieldError, Fields, Kind};
//! use rowguard::model::{Model, Table};
//! # use rowguard::executor::Executor;
//! use serde_json::json;
//!
//! struct Post;
//!
//! impl Table for Post {
//!     fn table_name(&self) -> &str {
//!         "post"
//!     }
//!
//!     fn fields(&self) -> Result<Fields, FieldError> {
//!         Ok(Fields::new()
//!             .field("id", Field::parse("int", &["primary_key", "unsigned", "not_null"])?)
//!             .field("title", Field::parse("varchar", &["max:5"])?)
//!             .field("date_start", Field::parse("datetime", &["not_null"])?))
//!     }
//! }
//!
//! # fn run(executor: impl Executor) -> Result<(), Box<dyn std::error::Error>> {
//! let mut posts = Model::new(Post, executor)?;
//! let args = json!({"title": "first test", "date_start": "2018-08-07 20:06:23"});
//! let id = posts.create(args.as_object().unwrap())?;
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod error;
pub mod statement;

pub use callbacks::{CallbackError, Callbacks, Stage};
pub use error::{ErrorKind, ModelError};
pub use statement::Statement;

use crate::config::PaginationConfig;
use crate::executor::{DbError, Executor};
use crate::field::{FieldError, Fields};
use crate::pagination::Pagination;
use crate::report::Report;
use crate::value::{json_to_value, Params, RawMap, Record};
#[cfg(feature = "tracing")]
use crate::tracing_helpers;
use serde_json::Value as JsonValue;

const INVALID_VALUES: &str = "Formating values invalid";
const FIELD_REQUIRED: &str = "field is required";

/// Declaration of a table
///
/// `join` and `filter` are the extension points of [`Model::all`]: they
/// return SQL fragments and may bind the parameters those fragments use. The
/// arguments they receive never carry the pagination keys of
/// [`PaginationConfig::reserved_keys`].
pub trait Table {
    /// Name used in generated SQL
    fn table_name(&self) -> &str;

    /// Column declarations, called once when the model is built
    ///
    /// # Errors
    ///
    /// Declaration errors abort [`Model::new`].
    fn fields(&self) -> Result<Fields, FieldError>;

    /// Argument keys dropped before `create` and `update` look at them
    fn parameters_to_remove(&self) -> &[&str] {
        &[]
    }

    /// JOIN fragment for listings; empty for none
    fn join(&self, _args: &RawMap, _params: &mut Params) -> String {
        String::new()
    }

    /// WHERE predicate for listings
    fn filter(&self, _args: &RawMap, _params: &mut Params) -> String {
        "1 = 1".to_string()
    }
}

/// Result of [`Model::all`]
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Rows(Vec<Record>),
    Count(u64),
}

/// CRUD façade over one table
pub struct Model<T, E> {
    table: T,
    executor: E,
    fields: Fields,
    callbacks: Callbacks,
    pagination: PaginationConfig,
    report: Report,
    params: Params,
    last_insert_id: Option<i64>,
}

impl<T: Table, E: Executor> Model<T, E> {
    /// Build a model with an empty callback registry
    ///
    /// # Errors
    ///
    /// Returns the error raised by [`Table::fields`].
    pub fn new(table: T, executor: E) -> Result<Self, FieldError> {
        Self::with_callbacks(table, executor, Callbacks::new())
    }

    /// Build a model around a caller-owned callback registry
    ///
    /// # Errors
    ///
    /// Returns the error raised by [`Table::fields`].
    pub fn with_callbacks(table: T, executor: E, callbacks: Callbacks) -> Result<Self, FieldError> {
        let fields = table.fields()?;
        Ok(Self {
            table,
            executor,
            fields,
            callbacks,
            pagination: PaginationConfig::default(),
            report: Report::new(),
            params: Params::new(),
            last_insert_id: None,
        })
    }

    /// Replace the pagination settings used by [`Model::all`]
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Errors and warnings of the last operation
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Id generated by the last successful `create`
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// List rows, or count them when the arguments ask for a count
    ///
    /// Rows are ordered, limited and offset according to
    /// [`Pagination::from_args`]. Declared columns of every row are coerced
    /// again on the way out.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Database`] with `"Error select all"` or
    ///   `"Error select count all"`
    /// - [`ModelError::Fields`] when a returned row fails coercion
    pub fn all(&mut self, args: &RawMap) -> Result<Listing, ModelError> {
        self.begin();
        let page = Pagination::from_args(args, self.fields.names(), &self.pagination);
        let table = self.table.table_name().to_string();
        let reserved = self.pagination.reserved_keys();
        let criteria: RawMap = args
            .iter()
            .filter(|(name, _)| !reserved.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let join = self.table.join(&criteria, &mut self.params);
        let filter = self.table.filter(&criteria, &mut self.params);

        if page.count_only {
            let sql = statement::count_sql(&table, &join, &filter);
            return match self.run("count", &sql, |db, sql, params| db.count(sql, params)) {
                Ok(count) => Ok(Listing::Count(count)),
                Err(err) => Err(self.fail_db("Error select count all", err)),
            };
        }

        let window = (!page.no_limit).then_some((page.limit, page.offset));
        let sql = statement::select_sql(&table, &join, &filter, &page.order_clause(), window);
        let rows = match self.run("select", &sql, |db, sql, params| db.query_all(sql, params)) {
            Ok(rows) => rows,
            Err(err) => return Err(self.fail_db("Error select all", err)),
        };

        let records: Vec<Record> = rows.iter().map(|row| self.coerce_row(row)).collect();
        if self.report.has_field_errors() {
            return Err(self.fail_fields(INVALID_VALUES));
        }
        Ok(Listing::Rows(records))
    }

    /// Fetch one row by primary key, keys given in declaration order
    ///
    /// # Errors
    ///
    /// - [`ModelError::Error`] with `"Error no primary key"`
    /// - [`ModelError::Fields`] when a key or the returned row fails coercion
    /// - [`ModelError::Database`] with `"Error select one"`
    pub fn one(&mut self, keys: &[JsonValue]) -> Result<Option<Record>, ModelError> {
        self.begin();
        let predicate = self.key_predicate(keys)?;
        let sql = statement::one_sql(self.table.table_name(), &predicate);
        let row = match self.run("select_one", &sql, |db, sql, params| db.query_one(sql, params)) {
            Ok(row) => row,
            Err(err) => return Err(self.fail_db("Error select one", err)),
        };

        let Some(row) = row else {
            return Ok(None);
        };
        let record = self.coerce_row(&row);
        if self.report.has_field_errors() {
            return Err(self.fail_fields(INVALID_VALUES));
        }
        Ok(Some(record))
    }

    /// Insert a row and return its generated id
    ///
    /// Not-null, non-key columns missing from the final parameters are
    /// filled from their defaults after the before-create callbacks ran.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Fields`] with `"Formating values invalid"` or
    ///   `"Missing required fields"`
    /// - [`ModelError::Error`] with `"Insert sql query is empty"`
    /// - [`ModelError::Database`] with `"Error creating"`
    /// - [`ModelError::Callback`] from any create callback
    pub fn create(&mut self, args: &RawMap) -> Result<i64, ModelError> {
        self.begin();
        self.coerce_args(args, false);
        if self.report.has_field_errors() {
            return Err(self.fail_fields(INVALID_VALUES));
        }
        if self.params.is_empty() {
            return Err(self.fail("Insert sql query is empty"));
        }

        let table = self.table.table_name().to_string();
        let sql = statement::insert_sql(&table, self.params.keys());
        let statement = Statement::new(sql, std::mem::take(&mut self.params));
        let Statement { mut sql, params } = self
            .callbacks
            .run_before(Stage::Create, statement)
            .map_err(ModelError::Callback)?;
        self.params = params;

        let mut defaults = Vec::new();
        for (name, field) in self.fields.iter() {
            if !field.is_not_null() || field.is_primary_key() || self.params.contains_key(name) {
                continue;
            }
            match field.default_value() {
                Some(value) => defaults.push((name.to_string(), value.clone())),
                None => self.report.add_field_error(name, FIELD_REQUIRED),
            }
        }
        if self.report.has_field_errors() {
            return Err(self.fail_fields("Missing required fields"));
        }
        for (name, value) in defaults {
            sql = match statement::inject_column(&sql, &name) {
                Some(sql) => sql,
                None => return Err(self.fail("Insert sql query is malformed")),
            };
            self.params.insert(name, value);
        }

        let id = match self.run("insert", &sql, |db, sql, params| db.insert(sql, params)) {
            Ok(id) => id,
            Err(err) => return Err(self.fail_db("Error creating", err)),
        };
        self.last_insert_id = Some(id);

        let params = std::mem::take(&mut self.params);
        self.params = self
            .callbacks
            .run_after(Stage::Create, Some(id), params)
            .map_err(ModelError::Callback)?;
        Ok(id)
    }

    /// Update the row identified by `keys` with the columns in `args`
    ///
    /// Primary-key columns in `args` are ignored.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Error`] with `"Error no primary key"` or
    ///   `"Update sql query is empty"`
    /// - [`ModelError::Fields`] with `"Formating values invalid"`
    /// - [`ModelError::Database`] with `"Error updating"`
    /// - [`ModelError::Callback`] from any update callback
    pub fn update(&mut self, args: &RawMap, keys: &[JsonValue]) -> Result<(), ModelError> {
        self.begin();
        let predicate = self.key_predicate(keys)?;
        self.coerce_args(args, true);
        if self.report.has_field_errors() {
            return Err(self.fail_fields(INVALID_VALUES));
        }

        let columns: Vec<&str> = self
            .params
            .keys()
            .filter(|name| !self.fields.get(name).is_some_and(|f| f.is_primary_key()))
            .collect();
        if columns.is_empty() {
            return Err(self.fail("Update sql query is empty"));
        }
        let sql = statement::update_sql(self.table.table_name(), &columns, &predicate);

        let statement = Statement::new(sql, std::mem::take(&mut self.params));
        let Statement { sql, params } = self
            .callbacks
            .run_before(Stage::Update, statement)
            .map_err(ModelError::Callback)?;
        self.params = params;

        if let Err(err) = self.run("update", &sql, |db, sql, params| db.update(sql, params)) {
            return Err(self.fail_db("Error updating", err));
        }

        let params = std::mem::take(&mut self.params);
        self.params = self
            .callbacks
            .run_after(Stage::Update, None, params)
            .map_err(ModelError::Callback)?;
        Ok(())
    }

    /// Delete the row identified by `keys`
    ///
    /// # Errors
    ///
    /// - [`ModelError::Error`] with `"Error no primary key"`
    /// - [`ModelError::Fields`] when a key fails coercion
    /// - [`ModelError::Database`] with `"Error deleting"`
    /// - [`ModelError::Callback`] from any delete callback
    pub fn delete(&mut self, keys: &[JsonValue]) -> Result<(), ModelError> {
        self.begin();
        let predicate = self.key_predicate(keys)?;
        let sql = statement::delete_sql(self.table.table_name(), &predicate);

        let statement = Statement::new(sql, std::mem::take(&mut self.params));
        let Statement { sql, params } = self
            .callbacks
            .run_before(Stage::Delete, statement)
            .map_err(ModelError::Callback)?;
        self.params = params;

        if let Err(err) = self.run("delete", &sql, |db, sql, params| db.delete(sql, params)) {
            return Err(self.fail_db("Error deleting", err));
        }

        let params = std::mem::take(&mut self.params);
        self.params = self
            .callbacks
            .run_after(Stage::Delete, None, params)
            .map_err(ModelError::Callback)?;
        Ok(())
    }

    fn begin(&mut self) {
        self.report.reset();
        self.params.clear();
    }

    /// Bind every primary-key column and return `k1 = :k1 AND ...`
    fn key_predicate(&mut self, keys: &[JsonValue]) -> Result<String, ModelError> {
        let mut columns = Vec::new();
        for (idx, (name, field)) in self.fields.primary_keys().enumerate() {
            match field.coerce(keys.get(idx)) {
                Ok(value) => {
                    self.params.insert(name, value);
                }
                Err(err) => {
                    log::warn!("{}.{name}: invalid key value: {err}", self.table.table_name());
                    self.report.add_field_error(name, err.to_string());
                }
            }
            columns.push(name.to_string());
        }

        if columns.is_empty() {
            return Err(self.fail("Error no primary key"));
        }
        if self.report.has_field_errors() {
            return Err(self.fail_fields(INVALID_VALUES));
        }
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        Ok(statement::key_predicate(&columns))
    }

    /// Coerce declared columns of `args` into the working parameters
    fn coerce_args(&mut self, args: &RawMap, skip_keys: bool) {
        let removed = self.table.parameters_to_remove();
        for (name, raw) in args {
            if removed.contains(&name.as_str()) {
                continue;
            }
            let Some(field) = self.fields.get(name) else {
                continue;
            };
            if skip_keys && field.is_primary_key() {
                continue;
            }
            match field.coerce(Some(raw)) {
                Ok(value) => {
                    self.params.insert(name.clone(), value);
                }
                Err(err) => {
                    log::warn!("{}.{name}: {err}", self.table.table_name());
                    self.report.add_field_error(name.clone(), err.to_string());
                }
            }
        }
    }

    /// Coerce a row read back from the database
    fn coerce_row(&mut self, row: &RawMap) -> Record {
        let mut record = Record::new();
        for (name, raw) in row {
            let value = match self.fields.get(name) {
                Some(field) => match field.coerce(Some(raw)) {
                    Ok(value) => value,
                    Err(err) => {
                        log::warn!("{}.{name}: stored value rejected: {err}", self.table.table_name());
                        self.report.add_field_error(name.clone(), err.to_string());
                        continue;
                    }
                },
                None => json_to_value(raw),
            };
            record.insert(name.clone(), value);
        }
        record
    }

    fn run<R>(
        &self,
        operation: &'static str,
        sql: &str,
        call: impl FnOnce(&E, &str, &Params) -> Result<R, DbError>,
    ) -> Result<R, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::query_span(operation, self.table.table_name()).entered();

        log::debug!(
            "{operation} on {}: {sql} ({} params)",
            self.table.table_name(),
            self.params.len()
        );
        call(&self.executor, sql, &self.params)
    }

    fn fail(&mut self, message: &str) -> ModelError {
        self.report.add_error(message);
        ModelError::Error(message.to_string())
    }

    fn fail_fields(&mut self, message: &str) -> ModelError {
        self.report.add_error(message);
        ModelError::Fields(message.to_string())
    }

    fn fail_db(&mut self, message: &str, source: DbError) -> ModelError {
        log::error!("{} on {}: {source}", message, self.table.table_name());
        self.report.add_error(message);
        ModelError::Database {
            message: message.to_string(),
            source,
        }
    }
}

impl<T, E> std::fmt::Debug for Model<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("fields", &self.fields)
            .field("callbacks", &self.callbacks)
            .field("report", &self.report)
            .field("last_insert_id", &self.last_insert_id)
            .finish_non_exhaustive()
    }
}
