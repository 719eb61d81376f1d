//! Statement logging through `tracing`.
//!
//! Every statement sent by [`crate::TableDef`] or [`crate::Repository`] emits a
//! `debug` event on target `pgtyped.sql` before execution and another one with
//! the row count and elapsed time after it. Enable with e.g.
//! `RUST_LOG=pgtyped.sql=debug`.

use std::time::Duration;

/// SQL longer than this (in bytes) is truncated in log events.
pub const MAX_LOGGED_SQL: usize = 200;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// `COPY .. FROM STDIN`
    Copy,
    Other,
}

impl QueryType {
    /// Detect the operation from the leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let head = sql.trim_start();
        let keyword = head
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();
        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else if keyword.eq_ignore_ascii_case("COPY") {
            QueryType::Copy
        } else {
            QueryType::Other
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn display_sql(sql: &str) -> String {
    if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    }
}

pub(crate) fn before_query(tag: &str, sql: &str, param_count: usize) {
    tracing::debug!(
        target: "pgtyped.sql",
        query_type = ?QueryType::from_sql(sql),
        tag,
        param_count,
        sql = %display_sql(sql),
    );
}

pub(crate) fn after_query(tag: &str, rows: u64, elapsed: Duration) {
    tracing::debug!(
        target: "pgtyped.sql",
        tag,
        rows,
        elapsed_us = elapsed.as_micros() as u64,
        "statement finished",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_from_sql() {
        assert_eq!(QueryType::from_sql("SELECT 1"), QueryType::Select);
        assert_eq!(QueryType::from_sql("  insert into t"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("UPDATE t SET a = 1"), QueryType::Update);
        assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Delete);
        assert_eq!(
            QueryType::from_sql("COPY t (a) FROM STDIN BINARY"),
            QueryType::Copy
        );
        assert_eq!(QueryType::from_sql("VACUUM"), QueryType::Other);
        assert_eq!(QueryType::from_sql(""), QueryType::Other);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("abc", 10), "abc");
        assert_eq!(truncate_sql_bytes("héllo", 2), "h");
        let long = "x".repeat(MAX_LOGGED_SQL + 5);
        assert!(display_sql(&long).ends_with("..."));
        assert_eq!(display_sql(&long).len(), MAX_LOGGED_SQL + 3);
    }
}
