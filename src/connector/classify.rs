//! Read/write statement classification.
//!
//! Execution shape depends on the statement kind: reads fetch a result set,
//! everything else executes and reports an affected-row count. Classification
//! uses [sqlparser](https://docs.rs/sqlparser/) so statements like
//! `WITH ... INSERT` are recognized as writes regardless of their leading
//! keyword. When the text does not parse (engine-specific syntax the parser
//! rejects), a leading-keyword check decides instead and the engine gets the
//! final word at execution time.

use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Shape of a SQL statement, as far as execution is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns a result set (SELECT, VALUES, EXPLAIN, PRAGMA, SHOW).
    Read,
    /// Mutates or administers; executed and committed, reported as an
    /// affected-row count (DML writes, DDL, everything else).
    Write,
}

/// Classify a SQL string. Multi-statement text is a read only if every
/// statement is.
pub fn classify_sql(sql: &str) -> StatementKind {
    match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) if !statements.is_empty() => {
            if statements.iter().all(is_read_statement) {
                StatementKind::Read
            } else {
                StatementKind::Write
            }
        }
        _ => classify_by_leading_keyword(sql),
    }
}

fn is_read_statement(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::Query(_)
            // EXPLAIN returns plan rows even for write statements
            | Statement::Explain { .. }
            | Statement::ExplainTable { .. }
            | Statement::Pragma { .. }
            | Statement::ShowTables { .. }
            | Statement::ShowColumns { .. }
            | Statement::ShowDatabases { .. }
            | Statement::ShowSchemas { .. }
            | Statement::ShowCreate { .. }
            | Statement::ShowVariable { .. }
            | Statement::ShowVariables { .. }
            | Statement::ShowStatus { .. }
            | Statement::ShowCollation { .. }
            | Statement::ShowFunctions { .. }
    )
}

/// Fallback for text sqlparser rejects: a leading-keyword check,
/// case-insensitive, ignoring leading whitespace. `WITH` is not a verdict by
/// itself; the statement body after the CTE clause decides.
fn classify_by_leading_keyword(sql: &str) -> StatementKind {
    let keyword = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "VALUES" | "EXPLAIN" | "PRAGMA" => StatementKind::Read,
        "WITH" => classify_cte_body(sql),
        _ => StatementKind::Write,
    }
}

/// Classify a `WITH`-prefixed statement by the first body keyword outside
/// the CTE definitions, i.e. at paren depth zero and outside any quoted
/// string or identifier.
fn classify_cte_body(sql: &str) -> StatementKind {
    let mut depth: u32 = 0;
    let mut closing_quote: Option<char> = None;
    let mut word = String::new();

    let verdict = |word: &str| match word {
        "SELECT" | "VALUES" => Some(StatementKind::Read),
        "INSERT" | "UPDATE" | "DELETE" | "REPLACE" | "CREATE" | "DROP" | "ALTER" => {
            Some(StatementKind::Write)
        }
        _ => None,
    };

    for ch in sql.chars() {
        if let Some(q) = closing_quote {
            if ch == q {
                closing_quote = None;
            }
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if depth == 0 {
                word.push(ch.to_ascii_uppercase());
            }
            continue;
        }
        if depth == 0 {
            if let Some(kind) = verdict(&word) {
                return kind;
            }
        }
        word.clear();
        match ch {
            '\'' | '"' | '`' => closing_quote = Some(ch),
            '[' => closing_quote = Some(']'),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    verdict(&word).unwrap_or(StatementKind::Read)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read() {
        assert_eq!(classify_sql("SELECT 1"), StatementKind::Read);
        assert_eq!(
            classify_sql("  select * from users where id = 1"),
            StatementKind::Read
        );
    }

    #[test]
    fn test_values_is_read() {
        assert_eq!(classify_sql("VALUES (1), (2)"), StatementKind::Read);
    }

    #[test]
    fn test_dml_writes() {
        assert_eq!(
            classify_sql("INSERT INTO t VALUES (1)"),
            StatementKind::Write
        );
        assert_eq!(
            classify_sql("UPDATE t SET a = 1 WHERE id = 2"),
            StatementKind::Write
        );
        assert_eq!(classify_sql("DELETE FROM t"), StatementKind::Write);
    }

    #[test]
    fn test_ddl_is_write() {
        assert_eq!(
            classify_sql("CREATE TABLE t (id INTEGER PRIMARY KEY)"),
            StatementKind::Write
        );
        assert_eq!(classify_sql("DROP TABLE t"), StatementKind::Write);
        assert_eq!(
            classify_sql("CREATE INDEX idx_t_a ON t(a)"),
            StatementKind::Write
        );
    }

    #[test]
    fn test_cte_select_is_read() {
        assert_eq!(
            classify_sql("WITH recent AS (SELECT * FROM t LIMIT 5) SELECT * FROM recent"),
            StatementKind::Read
        );
    }

    #[test]
    fn test_cte_insert_is_write() {
        // A leading-keyword check would call this a read
        assert_eq!(
            classify_sql("WITH src AS (SELECT 1 AS v) INSERT INTO t SELECT v FROM src"),
            StatementKind::Write
        );
    }

    #[test]
    fn test_mixed_statements_are_write() {
        assert_eq!(
            classify_sql("SELECT 1; DELETE FROM t"),
            StatementKind::Write
        );
    }

    #[test]
    fn test_pragma_is_read() {
        assert_eq!(classify_sql("PRAGMA table_info('t')"), StatementKind::Read);
    }

    #[test]
    fn test_unparseable_falls_back_to_leading_keyword() {
        assert_eq!(
            classify_sql("SELECT rowid, * FROM t INDEXED BY idx_t_a"),
            StatementKind::Read
        );
        assert_eq!(classify_sql("REINDEX t"), StatementKind::Write);
        assert_eq!(classify_sql(""), StatementKind::Write);
    }

    #[test]
    fn test_fallback_cte_body_decides() {
        // The fallback must not call every WITH-prefixed statement a read
        assert_eq!(
            classify_by_leading_keyword("WITH src AS (SELECT 1 AS v) INSERT INTO t SELECT v FROM src"),
            StatementKind::Write
        );
        assert_eq!(
            classify_by_leading_keyword("WITH recent AS (SELECT * FROM t) SELECT * FROM recent"),
            StatementKind::Read
        );
        assert_eq!(
            classify_by_leading_keyword("WITH d AS (SELECT id FROM old) DELETE FROM t WHERE id IN (SELECT id FROM d)"),
            StatementKind::Write
        );
    }

    #[test]
    fn test_fallback_cte_ignores_nested_and_quoted_text() {
        // Column lists, nested subqueries, and quoted names stay out of the verdict
        assert_eq!(
            classify_by_leading_keyword(
                "WITH x(a, b) AS (SELECT 1, (SELECT max(id) FROM t)) UPDATE t SET a = 1"
            ),
            StatementKind::Write
        );
        assert_eq!(
            classify_by_leading_keyword(
                "WITH \"insert\" AS (SELECT 'DELETE FROM t' AS s) SELECT * FROM \"insert\""
            ),
            StatementKind::Read
        );
    }
}
