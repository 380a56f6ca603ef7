//! Persistent query history store.
//!
//! Keeps a log of executed statements in its own SQLite file, independent of
//! any database under inspection. The backing schema is created lazily on
//! first use; a single-connection pool serializes access to the file.
//!
//! `add_query` never fails outward: a record that cannot be persisted is
//! reported with a sentinel id and the surrounding operation continues.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::models::{HistoryStatistics, QueryRecord};

/// Returned by [`QueryHistory::add_query`] when the record could not be
/// persisted.
pub const NOT_RECORDED: i64 = -1;

mod queries {
    pub const CREATE_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS query_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            database_path TEXT NOT NULL,
            query_text TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            execution_time REAL NOT NULL DEFAULT 0,
            row_count INTEGER NOT NULL DEFAULT 0,
            success INTEGER NOT NULL DEFAULT 1,
            error_message TEXT NOT NULL DEFAULT ''
        )
        "#;

    pub const CREATE_TIMESTAMP_INDEX: &str =
        "CREATE INDEX IF NOT EXISTS idx_timestamp ON query_history (timestamp DESC)";

    pub const CREATE_PATH_INDEX: &str =
        "CREATE INDEX IF NOT EXISTS idx_database_path ON query_history (database_path)";

    pub const INSERT: &str = r#"
        INSERT INTO query_history
            (database_path, query_text, timestamp, execution_time, row_count, success, error_message)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

    pub const SELECT_RECENT: &str = r#"
        SELECT id, database_path, query_text, timestamp, execution_time, row_count, success, error_message
        FROM query_history
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#;

    pub const SELECT_RECENT_FOR_PATH: &str = r#"
        SELECT id, database_path, query_text, timestamp, execution_time, row_count, success, error_message
        FROM query_history
        WHERE database_path = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#;

    pub const SEARCH: &str = r#"
        SELECT id, database_path, query_text, timestamp, execution_time, row_count, success, error_message
        FROM query_history
        WHERE query_text LIKE ? ESCAPE '\'
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#;

    pub const DELETE_ONE: &str = "DELETE FROM query_history WHERE id = ?";

    pub const DELETE_ALL: &str = "DELETE FROM query_history";

    pub const STATISTICS: &str = r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN success <> 0 THEN 1 ELSE 0 END), 0) AS success,
            COALESCE(AVG(CASE WHEN success <> 0 THEN execution_time END), 0.0) AS avg_execution_time,
            COUNT(DISTINCT database_path) AS unique_databases
        FROM query_history
        "#;
}

pub struct QueryHistory {
    file_path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl QueryHistory {
    /// A history store backed by the given file. Nothing is opened until the
    /// first operation.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            pool: OnceCell::new(),
        }
    }

    /// The platform default location for the history file.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dbscope")
            .join("history.db")
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn pool(&self) -> DbResult<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                if let Some(parent) = self.file_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            DbError::connection(format!(
                                "Failed to create history directory: {}",
                                e
                            ))
                        })?;
                    }
                }

                let options = SqliteConnectOptions::new()
                    .filename(&self.file_path)
                    .create_if_missing(true);
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(|e| {
                        DbError::connection(format!("Failed to open history store: {}", e))
                    })?;

                sqlx::query(queries::CREATE_TABLE).execute(&pool).await?;
                sqlx::query(queries::CREATE_TIMESTAMP_INDEX)
                    .execute(&pool)
                    .await?;
                sqlx::query(queries::CREATE_PATH_INDEX).execute(&pool).await?;

                debug!(path = %self.file_path.display(), "History store ready");
                Ok(pool)
            })
            .await
    }

    /// Persist a record and return its assigned id. Failures degrade to
    /// [`NOT_RECORDED`] so recording can never break the statement that
    /// produced it.
    pub async fn add_query(&self, record: &QueryRecord) -> i64 {
        let timestamp = if record.timestamp.is_empty() {
            Utc::now().to_rfc3339()
        } else {
            record.timestamp.clone()
        };

        let inserted = async {
            let pool = self.pool().await?;
            let result = sqlx::query(queries::INSERT)
                .bind(&record.database_path)
                .bind(&record.query_text)
                .bind(&timestamp)
                .bind(record.execution_time)
                .bind(record.row_count)
                .bind(record.success)
                .bind(&record.error_message)
                .execute(pool)
                .await?;
            Ok::<i64, DbError>(result.last_insert_rowid())
        }
        .await;

        match inserted {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to record query in history");
                NOT_RECORDED
            }
        }
    }

    /// Most recent records first, optionally restricted to one source
    /// database path.
    pub async fn get_history(
        &self,
        limit: i64,
        database_path: Option<&str>,
    ) -> DbResult<Vec<QueryRecord>> {
        let pool = self.pool().await?;
        let rows = match database_path {
            Some(path) => {
                sqlx::query(queries::SELECT_RECENT_FOR_PATH)
                    .bind(path)
                    .bind(limit)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query(queries::SELECT_RECENT)
                    .bind(limit)
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Case-insensitive substring search over query text, most recent first.
    pub async fn search_history(&self, term: &str, limit: i64) -> DbResult<Vec<QueryRecord>> {
        let pool = self.pool().await?;
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query(queries::SEARCH)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Delete one record; returns whether it existed.
    pub async fn delete_record(&self, id: i64) -> DbResult<bool> {
        let pool = self.pool().await?;
        let result = sqlx::query(queries::DELETE_ONE).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete everything; returns the number of records removed.
    pub async fn clear_history(&self) -> DbResult<u64> {
        let pool = self.pool().await?;
        let result = sqlx::query(queries::DELETE_ALL).execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Aggregate counts and the mean execution time of successful records.
    pub async fn get_statistics(&self) -> DbResult<HistoryStatistics> {
        let pool = self.pool().await?;
        let row = sqlx::query(queries::STATISTICS).fetch_one(pool).await?;
        let total: i64 = row.get("total");
        let success: i64 = row.get("success");
        Ok(HistoryStatistics {
            total,
            success,
            failed: total - success,
            avg_execution_time: row.get("avg_execution_time"),
            unique_databases: row.get("unique_databases"),
        })
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> QueryRecord {
    QueryRecord {
        id: Some(row.get("id")),
        database_path: row.get("database_path"),
        query_text: row.get("query_text"),
        timestamp: row.get("timestamp"),
        execution_time: row.get("execution_time"),
        row_count: row.get("row_count"),
        success: row.get::<i64, _>("success") != 0,
        error_message: row.get("error_message"),
    }
}

/// Escape LIKE metacharacters in user-supplied search terms.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
