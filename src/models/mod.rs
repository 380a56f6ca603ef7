//! Data models for dbscope.
//!
//! This module re-exports all value types used throughout the crate.

pub mod history;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use history::{HistoryStatistics, QueryRecord};
pub use query::{
    AFFECTED_ROWS_COLUMN, DEFAULT_PAGE_LIMIT, DEFAULT_QUERY_TIMEOUT_SECS, MAX_QUERY_TIMEOUT_SECS,
    QueryResult, Value,
};
pub use schema::{ColumnInfo, DatabaseInfo, ForeignKeyInfo, IndexInfo, TableSchema};
