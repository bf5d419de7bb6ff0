//! Column types understood by [`Field`](super::Field).

use super::error::FieldError;
use sea_query::Value;
use std::fmt;
use std::str::FromStr;

/// Column type of a field
///
/// Parsed from the names used in table declarations:
/// `int`, `float`, `char`, `varchar`, `text`, `date`, `datetime`, `time`,
/// `timestamp`, `year` and `enum(a,b,c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int,
    Float,
    Char,
    Varchar,
    Text,
    Date,
    Datetime,
    Time,
    Timestamp,
    Year,
    /// Allowed members, in declaration order
    Enum(Vec<String>),
}

impl Kind {
    /// Build an enum kind from its members
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Kind::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Whether values of this kind are plain strings subject to length bounds
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Kind::Char | Kind::Varchar | Kind::Text)
    }

    /// Typed SQL null for this kind
    #[must_use]
    pub fn null(&self) -> Value {
        match self {
            Kind::Int | Kind::Year => Value::BigInt(None),
            Kind::Float => Value::Double(None),
            _ => Value::String(None),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::Char => write!(f, "char"),
            Kind::Varchar => write!(f, "varchar"),
            Kind::Text => write!(f, "text"),
            Kind::Date => write!(f, "date"),
            Kind::Datetime => write!(f, "datetime"),
            Kind::Time => write!(f, "time"),
            Kind::Timestamp => write!(f, "timestamp"),
            Kind::Year => write!(f, "year"),
            Kind::Enum(values) => write!(f, "enum({})", values.join(",")),
        }
    }
}

impl FromStr for Kind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let kind = match lower.as_str() {
            "int" => Kind::Int,
            "float" => Kind::Float,
            "char" => Kind::Char,
            "varchar" => Kind::Varchar,
            "text" => Kind::Text,
            "date" => Kind::Date,
            "datetime" => Kind::Datetime,
            "time" => Kind::Time,
            "timestamp" => Kind::Timestamp,
            "year" => Kind::Year,
            _ if lower.starts_with("enum(") && lower.ends_with(')') => {
                // Members keep their case; only the keyword is case-insensitive
                let inner = &trimmed[5..trimmed.len() - 1];
                let values: Vec<String> = inner
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                if values.is_empty() {
                    return Err(FieldError::UnknownKind(s.to_string()));
                }
                Kind::Enum(values)
            }
            _ => return Err(FieldError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_kinds() {
        assert_eq!("int".parse::<Kind>().unwrap(), Kind::Int);
        assert_eq!(" VARCHAR ".parse::<Kind>().unwrap(), Kind::Varchar);
        assert_eq!("timestamp".parse::<Kind>().unwrap(), Kind::Timestamp);
    }

    #[test]
    fn test_parse_enum_keeps_member_case_and_order() {
        let kind: Kind = "enum(Draft, published,ARCHIVED)".parse().unwrap();
        assert_eq!(
            kind,
            Kind::enumeration(["Draft", "published", "ARCHIVED"])
        );
        assert_eq!(kind.to_string(), "enum(Draft,published,ARCHIVED)");
    }

    #[test]
    fn test_unknown_kind_fails() {
        assert_eq!(
            "blob".parse::<Kind>(),
            Err(FieldError::UnknownKind("blob".to_string()))
        );
        assert!("enum()".parse::<Kind>().is_err());
    }

    #[test]
    fn test_typed_nulls() {
        assert_eq!(Kind::Int.null(), Value::BigInt(None));
        assert_eq!(Kind::Year.null(), Value::BigInt(None));
        assert_eq!(Kind::Float.null(), Value::Double(None));
        assert_eq!(Kind::Date.null(), Value::String(None));
    }
}
