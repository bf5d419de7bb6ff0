//! Value containers and conversions between JSON and SQL values.
//!
//! Raw input (request arguments, rows read from the database) is JSON.
//! Coerced values and bound parameters are `sea_query::Value`. [`ValueMap`]
//! keeps `name -> Value` pairs in insertion order so generated SQL lists
//! columns in a predictable order.

use sea_query::Value;
use serde_json::{Map, Number, Value as JsonValue};

/// Raw arguments or row, as received from a caller or an executor
pub type RawMap = Map<String, JsonValue>;

/// Insertion-ordered map of column or parameter name to SQL value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

/// Named parameters bound to a statement
pub type Params = ValueMap;

/// A row after coercion
pub type Record = ValueMap;

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value; replacing keeps the original position
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render as a JSON object, keeping order
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.entries
                .iter()
                .map(|(n, v)| (n.clone(), value_to_json(v)))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Convert a JSON value without any column declaration
///
/// Used for columns a row carries but the table does not declare
/// (joined columns, computed columns).
#[must_use]
pub fn json_to_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::String(None),
        JsonValue::Bool(b) => Value::Bool(Some(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::BigInt(Some(i)),
            None => Value::Double(n.as_f64()),
        },
        JsonValue::String(s) => Value::String(Some(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Json(Some(Box::new(value.clone()))),
    }
}

/// Convert a SQL value back to JSON for export
#[must_use]
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(Some(b)) => JsonValue::Bool(*b),
        Value::TinyInt(Some(i)) => JsonValue::from(*i),
        Value::SmallInt(Some(i)) => JsonValue::from(*i),
        Value::Int(Some(i)) => JsonValue::from(*i),
        Value::BigInt(Some(i)) => JsonValue::from(*i),
        Value::TinyUnsigned(Some(u)) => JsonValue::from(*u),
        Value::SmallUnsigned(Some(u)) => JsonValue::from(*u),
        Value::Unsigned(Some(u)) => JsonValue::from(*u),
        Value::BigUnsigned(Some(u)) => JsonValue::from(*u),
        Value::Float(Some(f)) => float_to_json(f64::from(*f)),
        Value::Double(Some(d)) => float_to_json(*d),
        Value::String(Some(s)) => JsonValue::String(s.clone()),
        Value::Json(Some(j)) => (**j).clone(),
        _ => JsonValue::Null,
    }
}

// JSON has no NaN or infinities
fn float_to_json(f: f64) -> JsonValue {
    Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
}
