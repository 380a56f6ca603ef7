//! Error types for dbscope.
//!
//! This module defines all error types using `thiserror`. The three kinds are
//! deliberately distinguishable so callers can branch: a connection failure
//! means "pick another file", an unsupported extension means "no backend
//! registered", and a query error means "this lookup failed". Statement
//! execution never produces a `DbError` at all - those failures are carried
//! in-band by [`QueryResult::error`](crate::models::QueryResult).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query {
        message: String,
        /// The table or index the lookup was about, when known.
        object: Option<String>,
    },

    #[error("Unsupported database type: {extension}. Supported types: {supported}")]
    UnsupportedDatabase { extension: String, supported: String },
}

impl DbError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with no associated object.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            object: None,
        }
    }

    /// Create a query error about a named catalog object.
    pub fn query_on(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            object: Some(object.into()),
        }
    }

    /// Create an unsupported-database error.
    pub fn unsupported(extension: impl Into<String>, supported: impl Into<String>) -> Self {
        Self::UnsupportedDatabase {
            extension: extension.into(),
            supported: supported.into(),
        }
    }

    /// The catalog object this error is about, if any.
    pub fn object(&self) -> Option<&str> {
        match self {
            Self::Query { object, .. } => object.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError, keeping the engine message verbatim.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(msg.to_string()),
            sqlx::Error::Io(io_err) => DbError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::PoolClosed => DbError::connection("connection is closed"),
            sqlx::Error::PoolTimedOut => DbError::connection("timed out acquiring the handle"),
            sqlx::Error::Database(db_err) => DbError::query(db_err.message().to_string()),
            sqlx::Error::RowNotFound => DbError::query("no rows returned"),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::query_on(format!("column not found: {}", col), col)
            }
            other => DbError::query(other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::connection("File not found: /tmp/missing.db");
        assert!(err.to_string().contains("Connection failed"));
        assert!(err.to_string().contains("/tmp/missing.db"));
    }

    #[test]
    fn test_unsupported_lists_extensions() {
        let err = DbError::unsupported(".xyz", ".db, .sqlite, .sqlite3");
        let msg = err.to_string();
        assert!(msg.contains(".xyz"));
        assert!(msg.contains(".sqlite3"));
    }

    #[test]
    fn test_query_error_object() {
        let err = DbError::query_on("Table 'users' not found", "users");
        assert_eq!(err.object(), Some("users"));
        assert_eq!(DbError::query("not connected").object(), None);
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        assert!(matches!(
            DbError::connection("x"),
            DbError::Connection { .. }
        ));
        assert!(matches!(DbError::query("x"), DbError::Query { .. }));
        assert!(matches!(
            DbError::unsupported(".x", ".db"),
            DbError::UnsupportedDatabase { .. }
        ));
    }
}
