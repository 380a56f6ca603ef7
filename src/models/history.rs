//! Query history data models.

use serde::{Deserialize, Serialize};

/// One executed statement, as persisted by the history store.
///
/// Records are written once and never mutated; `id` is assigned by the store
/// on insertion, and `timestamp` is defaulted to the insertion time when the
/// caller leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Path of the database the statement ran against.
    pub database_path: String,
    pub query_text: String,
    /// ISO-8601 / RFC 3339.
    pub timestamp: String,
    /// Seconds.
    pub execution_time: f64,
    pub row_count: i64,
    pub success: bool,
    pub error_message: String,
}

impl QueryRecord {
    /// Create a record for a statement outcome, with the timestamp left for
    /// the store to assign.
    pub fn new(database_path: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            id: None,
            database_path: database_path.into(),
            query_text: query_text.into(),
            timestamp: String::new(),
            execution_time: 0.0,
            row_count: 0,
            success: true,
            error_message: String::new(),
        }
    }

    /// Set the execution time in seconds.
    pub fn with_execution_time(mut self, secs: f64) -> Self {
        self.execution_time = secs;
        self
    }

    /// Set the returned or affected row count.
    pub fn with_row_count(mut self, row_count: i64) -> Self {
        self.row_count = row_count;
        self
    }

    /// Mark the statement as failed with the engine's message.
    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = error_message.into();
        self
    }

    /// Set an explicit timestamp instead of the store-assigned default.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// Aggregate statistics over the history store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    pub total: i64,
    pub success: i64,
    /// `total - success`.
    pub failed: i64,
    /// Mean execution time in seconds over successful records only.
    pub avg_execution_time: f64,
    /// Count of distinct source database paths.
    pub unique_databases: i64,
}
