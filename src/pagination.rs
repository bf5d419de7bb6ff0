//! Paging and ordering parsed from request arguments.

use crate::config::PaginationConfig;
use crate::value::RawMap;
use serde_json::Value as JsonValue;
use std::fmt;

/// Sort direction of an ORDER BY term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Limit, offset, ordering and listing flags of one `all` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    /// Never empty
    pub order: Vec<(String, Direction)>,
    /// Caller opted out of LIMIT/OFFSET
    pub no_limit: bool,
    /// Caller wants the row count only
    pub count_only: bool,
}

impl Pagination {
    /// Read pagination from request arguments
    ///
    /// Order terms are `field`, `field:asc`, `field:desc`, `field desc` or
    /// `-field`, comma-separated or as a JSON array. Terms naming a field
    /// outside `allowed`, repeating an earlier field, or carrying an unknown
    /// direction are dropped. When nothing valid remains the order falls back
    /// to `config.default_order` ascending.
    ///
    /// # Example
    ///
    /// ```
    /// use rowguard::config::PaginationConfig;
    /// use rowguard::pagination::{Direction, Pagination};
    /// use serde_json::json;
    ///
    /// let args = json!({"page": 3, "limit": 10, "order": "-title,nope,title"});
    /// let page = Pagination::from_args(
    ///     args.as_object().unwrap(),
    ///     ["id", "title"],
    ///     &PaginationConfig::default(),
    /// );
    /// assert_eq!(page.offset, 20);
    /// assert_eq!(page.order, vec![("title".to_string(), Direction::Desc)]);
    /// ```
    pub fn from_args<'a>(
        args: &RawMap,
        allowed: impl IntoIterator<Item = &'a str>,
        config: &PaginationConfig,
    ) -> Self {
        let allowed: Vec<&str> = allowed.into_iter().collect();

        let mut limit = args
            .get(&config.limit_key)
            .and_then(as_count)
            .filter(|n| *n > 0)
            .unwrap_or(config.default_limit);
        if config.max_limit > 0 {
            limit = limit.min(config.max_limit);
        }

        let offset = match args.get(&config.offset_key).and_then(as_count) {
            Some(offset) => offset,
            None => {
                let page = args
                    .get(&config.page_key)
                    .and_then(as_count)
                    .filter(|n| *n > 0)
                    .unwrap_or(1);
                (page - 1).saturating_mul(limit)
            }
        };

        let mut order: Vec<(String, Direction)> = Vec::new();
        for term in args.get(&config.order_key).map(order_terms).unwrap_or_default() {
            let Some((field, direction)) = parse_term(&term) else {
                continue;
            };
            if allowed.contains(&field.as_str()) && !order.iter().any(|(f, _)| *f == field) {
                order.push((field, direction));
            }
        }
        if order.is_empty() {
            order.push((config.default_order.clone(), Direction::Asc));
        }

        Self {
            limit,
            offset,
            order,
            no_limit: args.get(&config.no_limit_key).is_some_and(is_truthy),
            count_only: args.get(&config.count_key).is_some_and(is_truthy),
        }
    }

    /// `a ASC, b DESC`
    #[must_use]
    pub fn order_clause(&self) -> String {
        self.order
            .iter()
            .map(|(field, direction)| format!("{field} {direction}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn order_terms(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::String(s) => s.split(',').map(str::to_string).collect(),
        JsonValue::Array(items) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_term(term: &str) -> Option<(String, Direction)> {
    let term = term.trim();
    if let Some(field) = term.strip_prefix('-') {
        return non_empty(field).map(|f| (f, Direction::Desc));
    }
    let split = term
        .split_once(':')
        .or_else(|| term.split_once(char::is_whitespace));
    match split {
        Some((field, direction)) => Some((non_empty(field)?, Direction::parse(direction)?)),
        None => non_empty(term).map(|f| (f, Direction::Asc)),
    }
}

fn non_empty(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

/// Non-negative integer from a number or numeric string
fn as_count(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: [&str; 3] = ["id", "title", "date_start"];

    fn paginate(args: JsonValue) -> Pagination {
        Pagination::from_args(
            args.as_object().expect("object"),
            FIELDS,
            &PaginationConfig::default(),
        )
    }

    #[test]
    fn test_defaults() {
        let page = paginate(json!({}));
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
        assert_eq!(page.order, vec![("id".to_string(), Direction::Asc)]);
        assert!(!page.no_limit);
        assert!(!page.count_only);
    }

    #[test]
    fn test_limit_is_capped_and_validated() {
        assert_eq!(paginate(json!({"limit": 1000})).limit, 100);
        assert_eq!(paginate(json!({"limit": "15"})).limit, 15);
        assert_eq!(paginate(json!({"limit": 0})).limit, 20);
        assert_eq!(paginate(json!({"limit": -4})).limit, 20);
        assert_eq!(paginate(json!({"limit": "many"})).limit, 20);
    }

    #[test]
    fn test_offset_from_page_or_explicit() {
        assert_eq!(paginate(json!({"page": 3, "limit": 10})).offset, 20);
        assert_eq!(paginate(json!({"page": 0})).offset, 0);
        assert_eq!(paginate(json!({"page": 3, "offset": 7})).offset, 7);
    }

    #[test]
    fn test_order_terms() {
        let page = paginate(json!({"order": "title:desc, date_start, -id"}));
        assert_eq!(
            page.order,
            vec![
                ("title".to_string(), Direction::Desc),
                ("date_start".to_string(), Direction::Asc),
                ("id".to_string(), Direction::Desc),
            ]
        );
        assert_eq!(page.order_clause(), "title DESC, date_start ASC, id DESC");
    }

    #[test]
    fn test_order_drops_unknown_and_duplicates() {
        let page = paginate(json!({"order": ["title desc", "secret", "title", "id:sideways"]}));
        assert_eq!(page.order, vec![("title".to_string(), Direction::Desc)]);
    }

    #[test]
    fn test_order_falls_back_to_default() {
        let page = paginate(json!({"order": "secret,-password"}));
        assert_eq!(page.order, vec![("id".to_string(), Direction::Asc)]);
        let page = paginate(json!({"order": 12}));
        assert_eq!(page.order_clause(), "id ASC");
    }

    #[test]
    fn test_flags() {
        let page = paginate(json!({"no_limit": true, "count": "1"}));
        assert!(page.no_limit);
        assert!(page.count_only);
        let page = paginate(json!({"no_limit": "false", "count": 0}));
        assert!(!page.no_limit);
        assert!(!page.count_only);
    }
}
