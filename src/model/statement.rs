//! SQL text assembly for [`Model`](super::Model) operations.
//!
//! Statements are plain SQL with named `:column` placeholders. Before
//! callbacks may rewrite both the text and the parameters, so the text is
//! kept as a `String` rather than a builder.

use crate::value::Params;

/// SQL text with its named parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Params) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

const VALUES_MARKER: &str = ") VALUES (";

fn from_clause(table: &str, join: &str) -> String {
    let join = join.trim();
    if join.is_empty() {
        format!("FROM {table}")
    } else {
        format!("FROM {table} {join}")
    }
}

/// `SELECT * FROM t [join] WHERE filter [ORDER BY ...] [LIMIT n OFFSET m]`
pub(crate) fn select_sql(
    table: &str,
    join: &str,
    filter: &str,
    order: &str,
    window: Option<(u64, u64)>,
) -> String {
    let mut sql = format!("SELECT * {} WHERE {}", from_clause(table, join), filter.trim());
    if !order.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }
    if let Some((limit, offset)) = window {
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    }
    sql
}

/// `SELECT count(*) FROM t [join] WHERE filter`
pub(crate) fn count_sql(table: &str, join: &str, filter: &str) -> String {
    format!("SELECT count(*) {} WHERE {}", from_clause(table, join), filter.trim())
}

/// `SELECT * FROM t WHERE predicate LIMIT 1`
pub(crate) fn one_sql(table: &str, predicate: &str) -> String {
    format!("SELECT * FROM {table} WHERE {predicate} LIMIT 1")
}

/// `INSERT INTO t (a, b) VALUES (:a, :b)`
pub(crate) fn insert_sql<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> String {
    let columns: Vec<&str> = columns.into_iter().collect();
    let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `UPDATE t SET a = :a, b = :b WHERE predicate`
pub(crate) fn update_sql(table: &str, columns: &[&str], predicate: &str) -> String {
    format!(
        "UPDATE {table} SET {} WHERE {predicate}",
        equalities(columns, ", ")
    )
}

/// `DELETE FROM t WHERE predicate`
pub(crate) fn delete_sql(table: &str, predicate: &str) -> String {
    format!("DELETE FROM {table} WHERE {predicate}")
}

/// `a = :a AND b = :b`
pub(crate) fn key_predicate(columns: &[&str]) -> String {
    equalities(columns, " AND ")
}

fn equalities(columns: &[&str], separator: &str) -> String {
    columns
        .iter()
        .map(|c| format!("{c} = :{c}"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Add one column to an `INSERT ... (cols) VALUES (vals)` statement
///
/// Clauses after the value list (`ON CONFLICT (...)`, `RETURNING ...`) are
/// left alone. Returns `None` when the text has no `) VALUES (` section or
/// the value list is never closed.
pub(crate) fn inject_column(sql: &str, column: &str) -> Option<String> {
    let marker = sql.to_ascii_uppercase().find(VALUES_MARKER)?;
    let close = closing_paren(sql, marker + VALUES_MARKER.len())?;
    Some(format!(
        "{}, {column}{}, :{column}{}",
        &sql[..marker],
        &sql[marker..close],
        &sql[close..]
    ))
}

/// Byte index of the `)` closing a list opened just before `start`
///
/// Parentheses inside single-quoted literals are not counted.
fn closing_paren(sql: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    for (idx, ch) in sql[start..].char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                if depth == 0 {
                    return Some(start + idx);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_sql() {
        assert_eq!(
            select_sql("post", "", "1 = 1", "id ASC", Some((20, 40))),
            "SELECT * FROM post WHERE 1 = 1 ORDER BY id ASC LIMIT 20 OFFSET 40"
        );
        assert_eq!(
            select_sql("post", " LEFT JOIN author ON author.id = post.author_id ", "1 = 1", "", None),
            "SELECT * FROM post LEFT JOIN author ON author.id = post.author_id WHERE 1 = 1"
        );
    }

    #[test]
    fn test_count_sql() {
        assert_eq!(
            count_sql("post", "", "status = :status"),
            "SELECT count(*) FROM post WHERE status = :status"
        );
    }

    #[test]
    fn test_write_statements() {
        assert_eq!(
            insert_sql("post", ["title", "date_start"]),
            "INSERT INTO post (title, date_start) VALUES (:title, :date_start)"
        );
        assert_eq!(
            update_sql("post", &["title", "body"], &key_predicate(&["id"])),
            "UPDATE post SET title = :title, body = :body WHERE id = :id"
        );
        assert_eq!(
            delete_sql("post", &key_predicate(&["id", "lang"])),
            "DELETE FROM post WHERE id = :id AND lang = :lang"
        );
        assert_eq!(
            one_sql("post", &key_predicate(&["id"])),
            "SELECT * FROM post WHERE id = :id LIMIT 1"
        );
    }

    #[test]
    fn test_inject_column() {
        let sql = insert_sql("post", ["title"]);
        assert_eq!(
            inject_column(&sql, "status").unwrap(),
            "INSERT INTO post (title, status) VALUES (:title, :status)"
        );
        assert_eq!(
            inject_column("insert into post (title) values (:title) returning id", "status").unwrap(),
            "insert into post (title, status) values (:title, :status) returning id"
        );
        assert_eq!(inject_column("DELETE FROM post", "status"), None);
    }

    #[test]
    fn test_inject_column_stops_at_value_list() {
        assert_eq!(
            inject_column(
                "INSERT INTO post (title) VALUES (:title) ON CONFLICT (title) DO NOTHING",
                "status"
            )
            .unwrap(),
            "INSERT INTO post (title, status) VALUES (:title, :status) ON CONFLICT (title) DO NOTHING"
        );
        assert_eq!(
            inject_column("INSERT INTO post (a, b) VALUES (lower(:a), ')') RETURNING (id)", "c").unwrap(),
            "INSERT INTO post (a, b, c) VALUES (lower(:a), ')', :c) RETURNING (id)"
        );
        assert_eq!(inject_column("INSERT INTO post (a) VALUES (:a", "c"), None);
    }
}
