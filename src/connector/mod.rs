//! Backend connector abstraction.
//!
//! [`DatabaseConnector`] is the capability contract every file-format backend
//! implements. Connectors are created (but not connected) by the
//! [`ConnectorFactory`](factory::ConnectorFactory), which maps file
//! extensions to constructors and can be extended at runtime.

pub mod classify;
pub mod factory;
pub mod sqlite;

use std::path::Path;

use async_trait::async_trait;

use crate::error::DbResult;
use crate::models::{DatabaseInfo, QueryResult, TableSchema};

pub use classify::{StatementKind, classify_sql};
pub use factory::{ConnectorCtor, ConnectorFactory};
pub use sqlite::SqliteConnector;

/// Capability contract for one database file format.
///
/// Error-handling asymmetry is part of the contract: connection and
/// schema-lookup failures return [`DbError`](crate::error::DbError) so the
/// caller must stop and react, while statement execution folds every failure
/// into [`QueryResult::error`] so no user-typed SQL can unwind a call stack.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Open the database file.
    ///
    /// Fails if the file does not exist, the extension is not recognized by
    /// this backend, or the engine rejects the file. Idempotent: connecting
    /// while already connected performs a full disconnect first.
    async fn connect(&mut self, path: &Path) -> DbResult<()>;

    /// Release the handle. Safe to call when already disconnected.
    async fn disconnect(&mut self);

    /// User tables, alphabetically sorted, excluding the engine's internal
    /// catalog objects. Empty (not an error) when not connected.
    async fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Views, alphabetically sorted. Optional capability: backends without
    /// view support report none.
    async fn list_views(&self) -> Vec<String> {
        Vec::new()
    }

    /// Full schema for one table. Fails when not connected or when the table
    /// does not exist.
    async fn get_schema(&self, table: &str) -> DbResult<TableSchema>;

    /// Bounded, optionally ordered page of table contents.
    ///
    /// An invalid `order_by` column surfaces as a `QueryResult`-level error.
    async fn get_table_data(
        &self,
        table: &str,
        offset: u64,
        limit: u64,
        order_by: Option<&str>,
        order_desc: bool,
    ) -> QueryResult;

    /// Execute arbitrary SQL with the given lock-wait timeout.
    ///
    /// Read statements return the result set; anything else is executed and
    /// committed, returning the affected-row count in the synthetic
    /// `affected_rows` column. Never raises: all failures, timeouts
    /// included, land in [`QueryResult::error`].
    async fn execute_query(&self, sql: &str, timeout_secs: u32) -> QueryResult;

    /// Total row count for a table. 0 (not an error) when not connected or
    /// on failure.
    async fn get_row_count(&self, table: &str) -> u64;

    /// Backend metadata for the open file. Optional capability.
    async fn database_info(&self) -> Option<DatabaseInfo> {
        None
    }

    /// Whether a handle is currently open.
    fn is_connected(&self) -> bool;

    /// Path of the open file, `None` when disconnected.
    fn file_path(&self) -> Option<&Path>;

    /// Backend type label for display (e.g., `"SQLite"`).
    fn database_type(&self) -> &'static str;
}
