//! JSON export of model rows.

use crate::executor::Executor;
use crate::model::{Listing, Model, ModelError, Table};
use crate::value::RawMap;
use serde_json::Value as JsonValue;

/// Serialize records to a JSON string
pub trait JsonExport {
    /// With `id`, the matching record (or `null`); without, every record
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying read.
    fn to_json(&mut self, id: Option<&[JsonValue]>) -> Result<String, ModelError>;
}

impl<T: Table, E: Executor> JsonExport for Model<T, E> {
    fn to_json(&mut self, id: Option<&[JsonValue]>) -> Result<String, ModelError> {
        let exported = match id {
            Some(keys) => self
                .one(keys)?
                .map_or(JsonValue::Null, |record| record.to_json()),
            None => {
                let mut args = RawMap::new();
                args.insert(self.pagination().no_limit_key.clone(), JsonValue::Bool(true));
                match self.all(&args)? {
                    Listing::Rows(rows) => JsonValue::Array(rows.iter().map(|r| r.to_json()).collect()),
                    Listing::Count(count) => JsonValue::from(count),
                }
            }
        };
        serde_json::to_string(&exported).map_err(|err| ModelError::Error(err.to_string()))
    }
}
