//! Field declarations and value coercion.
//!
//! A [`Field`] describes one column: its [`Kind`], the rules that bound or
//! check it, and an optional default. [`Field::coerce`] turns a raw JSON input
//! into the `sea_query::Value` that is bound to SQL statements, or explains
//! why it cannot.
//!
//! The coercion pipeline is:
//!
//! 1. absent input (`None`) resolves to the default, to a typed null, or fails
//!    with [`FieldError::InvalidDefault`] on a not-null field without default
//! 2. explicit null passes through untouched unless the field is not-null
//! 3. type-directed conversion, shaped by the built-in rules
//! 4. custom rules, in declaration order
//!
//! # Example
//!
//! ```
//! use rowguard::field::{Field, Kind};
//! use sea_query::Value;
//! use serde_json::json;
//!
//! let title = Field::parse("varchar", &["not_null", "max:5"]).unwrap();
//! assert_eq!(
//!     title.coerce(Some(&json!("first test"))).unwrap(),
//!     Value::String(Some("first".to_string()))
//! );
//!
//! let id = Field::new(Kind::Int).primary_key().unsigned().not_null();
//! assert!(id.coerce(Some(&json!(0))).is_err());
//! ```

pub mod error;
pub mod kind;
pub mod rule;
mod temporal;

pub use error::FieldError;
pub use kind::Kind;
pub use rule::{CustomRule, Rule};
pub use temporal::TIMESTAMP_MAX;

use rule::Bounds;
use sea_query::Value;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// Lowest value accepted by `year` columns
pub const YEAR_MIN: i64 = 1901;
/// Highest value accepted by `year` columns
pub const YEAR_MAX: i64 = 2155;

/// Declaration of one column
#[derive(Clone)]
pub struct Field {
    kind: Kind,
    primary_key: bool,
    foreign_key: bool,
    unsigned: bool,
    not_null: bool,
    email: bool,
    bounds: Bounds,
    custom: Vec<Arc<dyn CustomRule>>,
    default: Option<Value>,
}

impl Field {
    /// Create a nullable field without rules or default
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            primary_key: false,
            foreign_key: false,
            unsigned: false,
            not_null: false,
            email: false,
            bounds: Bounds::default(),
            custom: Vec::new(),
            default: None,
        }
    }

    /// Create a field from a kind and a list of rules
    pub fn with_rules(kind: Kind, rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut field = Self::new(kind);
        for rule in rules {
            field.push_rule(rule);
        }
        field
    }

    /// Declare a field from its textual form
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownKind`] or [`FieldError::UnknownRule`] for
    /// tokens that are not understood.
    pub fn parse(kind: &str, rules: &[&str]) -> Result<Self, FieldError> {
        let kind: Kind = kind.parse()?;
        let rules = rules
            .iter()
            .map(|token| token.parse::<Rule>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_rules(kind, rules))
    }

    fn push_rule(&mut self, rule: Rule) {
        match rule {
            Rule::PrimaryKey => self.primary_key = true,
            Rule::ForeignKey => self.foreign_key = true,
            Rule::Unsigned => self.unsigned = true,
            Rule::NotNull => self.not_null = true,
            Rule::Email => self.email = true,
            Rule::Min(n) => self.bounds.min = Some(n),
            Rule::Max(n) => self.bounds.max = Some(n),
            Rule::Range(lo, hi) => self.bounds.range = Some((lo, hi)),
            Rule::Custom(rule) => self.custom.push(rule),
        }
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.push_rule(Rule::PrimaryKey);
        self
    }

    #[must_use]
    pub fn foreign_key(mut self) -> Self {
        self.push_rule(Rule::ForeignKey);
        self
    }

    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.push_rule(Rule::Unsigned);
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.push_rule(Rule::NotNull);
        self
    }

    #[must_use]
    pub fn email(mut self) -> Self {
        self.push_rule(Rule::Email);
        self
    }

    #[must_use]
    pub fn min(mut self, n: f64) -> Self {
        self.push_rule(Rule::Min(n));
        self
    }

    #[must_use]
    pub fn max(mut self, n: f64) -> Self {
        self.push_rule(Rule::Max(n));
        self
    }

    #[must_use]
    pub fn range(mut self, lo: f64, hi: f64) -> Self {
        self.push_rule(Rule::Range(lo, hi));
        self
    }

    /// Append a custom rule; custom rules run in the order they are added
    #[must_use]
    pub fn rule(mut self, rule: impl CustomRule + 'static) -> Self {
        self.push_rule(Rule::custom(rule));
        self
    }

    /// Set the default value, coerced through this field's own rules
    ///
    /// Declare every rule before the default: the stored default is not
    /// re-checked against rules added later.
    ///
    /// # Errors
    ///
    /// Returns the coercion error when the default itself is invalid.
    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Result<Self, FieldError> {
        self.default = None;
        let value = self.coerce(Some(&default.into()))?;
        self.default = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key
    }

    /// Primary or foreign key
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.primary_key || self.foreign_key
    }

    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    #[must_use]
    pub fn is_email(&self) -> bool {
        self.email
    }

    /// The coerced default, if one was declared
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Coerce a raw input into a bindable value
    ///
    /// `None` means the value was not supplied at all, which is different from
    /// an explicit JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] hit by the pipeline.
    pub fn coerce(&self, value: Option<&JsonValue>) -> Result<Value, FieldError> {
        let Some(value) = value else {
            return self.resolve_absent();
        };

        if value.is_null() {
            if self.not_null {
                return Err(FieldError::NullNotAuthorized);
            }
            return Ok(self.kind.null());
        }

        let mut converted = self.convert(value)?;
        for rule in &self.custom {
            converted = rule.apply(converted)?;
        }
        Ok(converted)
    }

    fn resolve_absent(&self) -> Result<Value, FieldError> {
        match &self.default {
            Some(default) => Ok(default.clone()),
            None if self.not_null => Err(FieldError::InvalidDefault),
            None => Ok(self.kind.null()),
        }
    }

    fn convert(&self, value: &JsonValue) -> Result<Value, FieldError> {
        let converted = match &self.kind {
            Kind::Int => {
                let mut n = as_integer(value).ok_or(FieldError::InvalidInt)?;
                if self.unsigned && n < 0 {
                    n = 0;
                }
                if self.is_key() && n < 1 {
                    return Err(FieldError::InvalidKey);
                }
                Value::BigInt(Some(self.bounds.clamp_int(n)))
            }
            Kind::Float => {
                let mut n = as_number(value).ok_or(FieldError::InvalidFloat)?;
                if self.unsigned && n < 0.0 {
                    n = 0.0;
                }
                Value::Double(Some(self.bounds.clamp_float(n)))
            }
            Kind::Char | Kind::Varchar | Kind::Text => {
                let text = as_text(value).ok_or(FieldError::InvalidString)?;
                Value::String(Some(self.bounds.bound_string(text)?))
            }
            Kind::Date => {
                let text = as_text(value).ok_or(FieldError::InvalidDate)?;
                Value::String(Some(temporal::to_date(&text)?))
            }
            Kind::Datetime => {
                let text = as_text(value).ok_or(FieldError::InvalidDatetime)?;
                Value::String(Some(temporal::to_datetime(&text)?))
            }
            Kind::Time => {
                let text = as_text(value).ok_or(FieldError::InvalidTime)?;
                Value::String(Some(temporal::to_time(&text)?))
            }
            Kind::Timestamp => {
                let stamp = match (as_number(value), value) {
                    (Some(seconds), _) => temporal::timestamp_from_epoch(seconds)?,
                    (None, JsonValue::String(text)) => temporal::timestamp_from_str(text)?,
                    (None, _) => return Err(FieldError::InvalidTimestamp),
                };
                Value::String(Some(stamp))
            }
            Kind::Year => {
                let mut n = as_integer(value).ok_or(FieldError::InvalidYear)?;
                if self.unsigned && n < 0 {
                    n = 0;
                }
                let n = self.bounds.clamp_int(n);
                if !(YEAR_MIN..=YEAR_MAX).contains(&n) {
                    return Err(FieldError::InvalidYear);
                }
                Value::BigInt(Some(n))
            }
            Kind::Enum(values) => {
                let text = as_text(value).ok_or(FieldError::InvalidEnum)?;
                if !values.iter().any(|v| *v == text) {
                    return Err(FieldError::InvalidEnum);
                }
                Value::String(Some(text))
            }
        };

        if self.email && (self.kind.is_string() || matches!(self.kind, Kind::Enum(_))) {
            if let Value::String(Some(text)) = &converted {
                check_email(text)?;
            }
        }

        Ok(converted)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let custom: Vec<&str> = self.custom.iter().map(|rule| rule.name()).collect();
        f.debug_struct("Field")
            .field("kind", &self.kind)
            .field("primary_key", &self.primary_key)
            .field("foreign_key", &self.foreign_key)
            .field("unsigned", &self.unsigned)
            .field("not_null", &self.not_null)
            .field("email", &self.email)
            .field("bounds", &self.bounds)
            .field("custom", &custom)
            .field("default", &self.default)
            .finish()
    }
}

/// Columns of a table, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Fields {
    columns: Vec<(String, Field)>,
}

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Fields::insert`]
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.insert(name, field);
        self
    }

    /// Declare a column; redeclaring a name replaces it in place
    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field,
            None => self.columns.push((name, field)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, field)| field)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.columns.iter().map(|(n, field)| (n.as_str(), field))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Primary-key columns, in declaration order
    pub fn primary_keys(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.iter().filter(|(_, field)| field.is_primary_key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn check_email(text: &str) -> Result<(), FieldError> {
    if !text.contains('@') || text.starts_with('@') || text.ends_with('@') {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// Numeric reading of a raw input: JSON numbers or numeric strings
fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => numeric_str(s),
        _ => None,
    }
}

fn as_integer(value: &JsonValue) -> Option<i64> {
    if let JsonValue::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    // Saturating truncation toward zero
    as_number(value).map(|n| n.trunc() as i64)
}

fn numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// String cast of a raw input; arrays and objects have none
fn as_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(number_text(n)),
        JsonValue::Bool(true) => Some("1".to_string()),
        JsonValue::Bool(false) => Some(String::new()),
        _ => None,
    }
}

/// Integral floats render without a fractional part (`1.0` -> `"1"`)
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
