//! Rules attached to a [`Field`](super::Field).
//!
//! Built-in rules (`primary_key`, `unsigned`, `min:N`, ...) shape the type
//! conversion itself. [`CustomRule`] implementations run afterwards, in the
//! order they were declared.

use super::error::FieldError;
use sea_query::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Caller-supplied coercion step
///
/// Receives the converted, non-null value and returns the value to keep.
/// Returning an error aborts the coercion with that error.
///
/// Closures of the shape `Fn(Value) -> Result<Value, FieldError>` implement
/// this trait directly.
///
/// # Example
///
/// ```
/// use rowguard::field::{Field, FieldError, Kind};
/// use sea_query::Value;
///
/// let upper = |value: Value| -> Result<Value, FieldError> {
///     match value {
///         Value::String(Some(s)) => Ok(Value::String(Some(s.to_uppercase()))),
///         other => Ok(other),
///     }
/// };
/// let code = Field::new(Kind::Char).rule(upper);
/// assert_eq!(
///     code.coerce(Some(&"fr".into())).unwrap(),
///     Value::String(Some("FR".to_string()))
/// );
/// ```
pub trait CustomRule: Send + Sync {
    /// Apply the rule to a converted value
    fn apply(&self, value: Value) -> Result<Value, FieldError>;

    /// Name shown in debug output
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> CustomRule for F
where
    F: Fn(Value) -> Result<Value, FieldError> + Send + Sync,
{
    fn apply(&self, value: Value) -> Result<Value, FieldError> {
        self(value)
    }
}

/// A single rule in a field declaration
#[derive(Clone)]
pub enum Rule {
    PrimaryKey,
    ForeignKey,
    /// Negative numbers clamp to zero
    Unsigned,
    NotNull,
    /// String must contain `@` neither first nor last
    Email,
    /// Numeric lower clamp, or minimum string length
    Min(f64),
    /// Numeric upper clamp, or string truncation length
    Max(f64),
    /// Both of the above at once
    Range(f64, f64),
    Custom(Arc<dyn CustomRule>),
}

impl Rule {
    /// Wrap a caller-supplied rule
    pub fn custom(rule: impl CustomRule + 'static) -> Self {
        Rule::Custom(Arc::new(rule))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::PrimaryKey => write!(f, "PrimaryKey"),
            Rule::ForeignKey => write!(f, "ForeignKey"),
            Rule::Unsigned => write!(f, "Unsigned"),
            Rule::NotNull => write!(f, "NotNull"),
            Rule::Email => write!(f, "Email"),
            Rule::Min(n) => write!(f, "Min({n})"),
            Rule::Max(n) => write!(f, "Max({n})"),
            Rule::Range(lo, hi) => write!(f, "Range({lo}, {hi})"),
            Rule::Custom(rule) => write!(f, "Custom({})", rule.name()),
        }
    }
}

impl FromStr for Rule {
    type Err = FieldError;

    /// Parse a rule token such as `not_null`, `max:5` or `range:1,10`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FieldError::UnknownRule(s.to_string());
        let token = s.trim();
        let (name, arg) = match token.split_once(':') {
            Some((name, arg)) => (name.trim().to_ascii_lowercase(), Some(arg.trim())),
            None => (token.to_ascii_lowercase(), None),
        };
        let number = |raw: &str| raw.trim().parse::<f64>().ok().filter(|n| n.is_finite());

        let rule = match (name.as_str(), arg) {
            ("primary_key", None) => Rule::PrimaryKey,
            ("foreign_key", None) => Rule::ForeignKey,
            ("unsigned", None) => Rule::Unsigned,
            ("not_null", None) => Rule::NotNull,
            ("email", None) => Rule::Email,
            ("min", Some(arg)) => Rule::Min(number(arg).ok_or_else(unknown)?),
            ("max", Some(arg)) => Rule::Max(number(arg).ok_or_else(unknown)?),
            ("range", Some(arg)) => {
                let (lo, hi) = arg.split_once(',').ok_or_else(unknown)?;
                Rule::Range(
                    number(lo).ok_or_else(unknown)?,
                    number(hi).ok_or_else(unknown)?,
                )
            }
            _ => return Err(unknown()),
        };
        Ok(rule)
    }
}

/// Declared `min` / `max` / `range` values of a field
///
/// The three are stored independently; a later declaration of the same
/// dimension replaces the earlier one and all declared bounds apply.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: Option<(f64, f64)>,
}

impl Bounds {
    pub fn clamp_int(&self, mut n: i64) -> i64 {
        if let Some(min) = self.min {
            if (n as f64) < min {
                n = min.ceil() as i64;
            }
        }
        if let Some(max) = self.max {
            if (n as f64) > max {
                n = max.floor() as i64;
            }
        }
        if let Some((lo, hi)) = self.range {
            if (n as f64) < lo {
                n = lo.ceil() as i64;
            }
            if (n as f64) > hi {
                n = hi.floor() as i64;
            }
        }
        n
    }

    pub fn clamp_float(&self, mut n: f64) -> f64 {
        if let Some(min) = self.min {
            if n < min {
                n = min;
            }
        }
        if let Some(max) = self.max {
            if n > max {
                n = max;
            }
        }
        if let Some((lo, hi)) = self.range {
            if n < lo {
                n = lo;
            }
            if n > hi {
                n = hi;
            }
        }
        n
    }

    /// Enforce length bounds: too short fails, too long is truncated
    pub fn bound_string(&self, s: String) -> Result<String, FieldError> {
        let mut s = s;
        if let Some(min) = self.min {
            check_min_length(&s, min)?;
        }
        if let Some(max) = self.max {
            s = truncate_chars(s, max);
        }
        if let Some((lo, hi)) = self.range {
            check_min_length(&s, lo)?;
            s = truncate_chars(s, hi);
        }
        Ok(s)
    }
}

fn length_bound(n: f64) -> usize {
    if n <= 0.0 {
        0
    } else {
        n as usize
    }
}

fn check_min_length(s: &str, min: f64) -> Result<(), FieldError> {
    if s.chars().count() < length_bound(min) {
        return Err(FieldError::InvalidMinLength);
    }
    Ok(())
}

fn truncate_chars(s: String, max: f64) -> String {
    let max = length_bound(max);
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}
