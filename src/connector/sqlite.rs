//! SQLite connector.
//!
//! Implements the capability contract against a single SQLite file. The
//! connector owns exactly one handle, realized as a single-connection sqlx
//! pool so access is serialized without an explicit lock. Schema discovery
//! reads the catalog pragmas (`table_info`, `foreign_key_list`, `index_list`,
//! `index_info`); row counts and DDL come from `sqlite_master` queries.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::connector::classify::{StatementKind, classify_sql};
use crate::connector::DatabaseConnector;
use crate::error::{DbError, DbResult};
use crate::models::{
    ColumnInfo, DatabaseInfo, ForeignKeyInfo, IndexInfo, MAX_QUERY_TIMEOUT_SECS, QueryResult,
    TableSchema, DEFAULT_QUERY_TIMEOUT_SECS,
};

/// File extensions handled by this backend, lowercase with leading dot.
pub const SQLITE_EXTENSIONS: &[&str] = &[".db", ".sqlite", ".sqlite3"];

mod queries {
    pub const LIST_TABLES: &str = r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#;

    pub const LIST_VIEWS: &str = r#"
        SELECT name FROM sqlite_master
        WHERE type = 'view'
        ORDER BY name
        "#;

    pub const TABLE_DDL: &str = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?";
}

/// Quote an identifier for interpolation into generated SQL, tolerating
/// names with spaces or reserved words.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for pragma arguments, which do not accept
/// parameter placeholders.
fn quote_literal(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// The engine's message text, verbatim when available.
fn engine_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

pub struct SqliteConnector {
    pool: Option<SqlitePool>,
    file_path: Option<PathBuf>,
}

impl SqliteConnector {
    pub fn new() -> Self {
        Self {
            pool: None,
            file_path: None,
        }
    }

    fn pool(&self) -> DbResult<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| DbError::query("Not connected to database"))
    }

    async fn fetch_columns(
        &self,
        pool: &SqlitePool,
        table: &str,
    ) -> DbResult<(Vec<ColumnInfo>, Vec<String>)> {
        let pragma = format!("PRAGMA table_info({})", quote_literal(table));
        let rows = sqlx::query(&pragma).fetch_all(pool).await?;

        let mut columns = Vec::with_capacity(rows.len());
        let mut primary_keys = Vec::new();
        for row in &rows {
            let name: String = row.get("name");
            let declared: String = row.get("type");
            let notnull: i32 = row.get("notnull");
            let default_value: Option<String> = row.try_get("dflt_value").ok().flatten();
            let pk: i32 = row.get("pk");

            // Untyped columns carry an empty declared type
            let data_type = if declared.is_empty() {
                "BLOB".to_string()
            } else {
                declared
            };

            let mut column =
                ColumnInfo::new(&name, data_type, notnull == 0).with_primary_key(pk > 0);
            if let Some(default) = default_value {
                column = column.with_default(default);
            }
            if pk > 0 {
                primary_keys.push(name);
            }
            columns.push(column);
        }
        Ok((columns, primary_keys))
    }

    async fn fetch_foreign_keys(&self, pool: &SqlitePool, table: &str) -> Vec<ForeignKeyInfo> {
        let pragma = format!("PRAGMA foreign_key_list({})", quote_literal(table));
        let rows = sqlx::query(&pragma).fetch_all(pool).await.unwrap_or_default();

        rows.iter()
            .map(|row| {
                let column: String = row.get("from");
                let ref_table: String = row.get("table");
                let ref_column: String = row.get("to");
                ForeignKeyInfo::new(column, ref_table, ref_column)
            })
            .collect()
    }

    async fn fetch_indexes(&self, pool: &SqlitePool, table: &str) -> Vec<IndexInfo> {
        let pragma = format!("PRAGMA index_list({})", quote_literal(table));
        let index_rows = sqlx::query(&pragma).fetch_all(pool).await.unwrap_or_default();

        let mut indexes = Vec::new();
        for index_row in &index_rows {
            let name: String = index_row.get("name");
            let is_unique: i32 = index_row.get("unique");

            let columns = self.fetch_index_columns(pool, &name).await;
            // Expression index members have no column name; an index with no
            // named members is not reported
            if !columns.is_empty() {
                indexes.push(IndexInfo::new(name, columns).with_unique(is_unique != 0));
            }
        }
        indexes
    }

    async fn fetch_index_columns(&self, pool: &SqlitePool, index: &str) -> Vec<String> {
        let pragma = format!("PRAGMA index_info({})", quote_literal(index));
        sqlx::query(&pragma)
            .fetch_all(pool)
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row.try_get::<Option<String>, _>("name").ok().flatten())
            .collect()
    }

    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        let pool = self.pool()?;
        let (columns, _) = self.fetch_columns(pool, table).await?;
        Ok(columns.iter().any(|c| c.name == column))
    }

    async fn fetch_ddl(&self, pool: &SqlitePool, table: &str) -> String {
        sqlx::query_scalar::<_, Option<String>>(queries::TABLE_DDL)
            .bind(table)
            .fetch_optional(pool)
            .await
            .ok()
            .flatten()
            .flatten()
            .unwrap_or_default()
    }
}

impl Default for SqliteConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseConnector for SqliteConnector {
    async fn connect(&mut self, path: &Path) -> DbResult<()> {
        if !path.exists() {
            return Err(DbError::connection(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        if !SQLITE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DbError::connection(format!(
                "Unsupported file extension: {}. Supported: {}",
                extension,
                SQLITE_EXTENSIONS.join(", ")
            )));
        }

        // One handle at a time: tear down any prior connection first
        if self.pool.is_some() {
            self.disconnect().await;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(u64::from(DEFAULT_QUERY_TIMEOUT_SECS)));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                DbError::connection(format!("Failed to connect to database: {}", engine_message(&e)))
            })?;

        info!(path = %path.display(), "Connected to SQLite database");
        self.pool = Some(pool);
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            debug!(path = ?self.file_path, "Disconnected");
        }
        self.file_path = None;
    }

    async fn list_tables(&self) -> DbResult<Vec<String>> {
        let Some(pool) = self.pool.as_ref() else {
            return Ok(Vec::new());
        };
        let tables = sqlx::query_scalar::<_, String>(queries::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        debug!(count = tables.len(), "Listed tables");
        Ok(tables)
    }

    async fn list_views(&self) -> Vec<String> {
        let Some(pool) = self.pool.as_ref() else {
            return Vec::new();
        };
        sqlx::query_scalar::<_, String>(queries::LIST_VIEWS)
            .fetch_all(pool)
            .await
            .unwrap_or_default()
    }

    async fn get_schema(&self, table: &str) -> DbResult<TableSchema> {
        let pool = self.pool()?;

        let (mut columns, primary_keys) = self.fetch_columns(pool, table).await?;
        if columns.is_empty() {
            return Err(DbError::query_on(
                format!("Table '{}' not found", table),
                table,
            ));
        }

        let foreign_keys = self.fetch_foreign_keys(pool, table).await;
        for fk in &foreign_keys {
            if let Some(column) = columns.iter_mut().find(|c| c.name == fk.column) {
                column.foreign_key = Some(fk.target());
            }
        }

        let indexes = self.fetch_indexes(pool, table).await;
        let row_count = self.get_row_count(table).await;
        let ddl = self.fetch_ddl(pool, table).await;

        Ok(TableSchema {
            name: table.to_string(),
            columns,
            primary_keys,
            foreign_keys,
            indexes,
            row_count,
            ddl,
        })
    }

    async fn get_table_data(
        &self,
        table: &str,
        offset: u64,
        limit: u64,
        order_by: Option<&str>,
        order_desc: bool,
    ) -> QueryResult {
        let mut sql = format!("SELECT * FROM {}", quote_ident(table));

        if let Some(column) = order_by {
            // The engine reads an unknown double-quoted name as a string
            // literal, so the ordering column must be checked against the
            // catalog instead of left to the query
            match self.column_exists(table, column).await {
                Ok(true) => {}
                Ok(false) => {
                    return QueryResult::failure(format!("No such column: {}", column), 0.0);
                }
                Err(e) => return QueryResult::failure(e.to_string(), 0.0),
            }
            let direction = if order_desc { "DESC" } else { "ASC" };
            sql.push_str(&format!(" ORDER BY {} {}", quote_ident(column), direction));
        }

        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        self.execute_query(&sql, DEFAULT_QUERY_TIMEOUT_SECS).await
    }

    async fn execute_query(&self, sql: &str, timeout_secs: u32) -> QueryResult {
        let Some(pool) = self.pool.as_ref() else {
            return QueryResult::failure("Not connected to database", 0.0);
        };

        let timeout_secs = timeout_secs.clamp(1, MAX_QUERY_TIMEOUT_SECS);
        let guard = Duration::from_secs(u64::from(timeout_secs));
        let start = Instant::now();

        // Reconfigure the lock wait before every statement; the caller's
        // timeout is advisory to the engine's busy handler
        let pragma = format!("PRAGMA busy_timeout = {}", u64::from(timeout_secs) * 1000);
        if let Err(e) = sqlx::query(&pragma).execute(pool).await {
            return QueryResult::failure(engine_message(&e), start.elapsed().as_secs_f64());
        }

        debug!(sql = %sql, timeout_secs, "Executing query");

        match classify_sql(sql) {
            StatementKind::Read => {
                match timeout(guard, sqlx::query(sql).fetch_all(pool)).await {
                    Ok(Ok(rows)) => {
                        let columns: Vec<String> = match rows.first() {
                            Some(row) => {
                                use sqlx::Column;
                                row.columns().iter().map(|c| c.name().to_string()).collect()
                            }
                            // Zero rows carry no column metadata; ask the
                            // prepared statement instead
                            None => describe_columns(pool, sql).await,
                        };
                        let decoded = rows.iter().map(decode_row).collect();
                        QueryResult::rows(columns, decoded, start.elapsed().as_secs_f64())
                    }
                    Ok(Err(e)) => {
                        QueryResult::failure(engine_message(&e), start.elapsed().as_secs_f64())
                    }
                    Err(_) => {
                        warn!(timeout_secs, "Query timed out");
                        QueryResult::failure(
                            format!("Query timed out after {}s", timeout_secs),
                            start.elapsed().as_secs_f64(),
                        )
                    }
                }
            }
            StatementKind::Write => match timeout(guard, sqlx::query(sql).execute(pool)).await {
                Ok(Ok(result)) => {
                    QueryResult::write(result.rows_affected(), start.elapsed().as_secs_f64())
                }
                Ok(Err(e)) => {
                    QueryResult::failure(engine_message(&e), start.elapsed().as_secs_f64())
                }
                Err(_) => {
                    warn!(timeout_secs, "Write timed out");
                    QueryResult::failure(
                        format!("Query timed out after {}s", timeout_secs),
                        start.elapsed().as_secs_f64(),
                    )
                }
            },
        }
    }

    async fn get_row_count(&self, table: &str) -> u64 {
        let Some(pool) = self.pool.as_ref() else {
            return 0;
        };
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(pool)
            .await
            .map(|n| n.max(0) as u64)
            .unwrap_or(0)
    }

    async fn database_info(&self) -> Option<DatabaseInfo> {
        let pool = self.pool.as_ref()?;

        let engine_version = sqlx::query_scalar::<_, String>("SELECT sqlite_version()")
            .fetch_one(pool)
            .await
            .ok()?;
        let page_size = sqlx::query_scalar::<_, i64>("PRAGMA page_size")
            .fetch_one(pool)
            .await
            .ok()?;
        let page_count = sqlx::query_scalar::<_, i64>("PRAGMA page_count")
            .fetch_one(pool)
            .await
            .ok()?;
        let encoding = sqlx::query_scalar::<_, String>("PRAGMA encoding")
            .fetch_one(pool)
            .await
            .ok()?;

        let page_size = page_size.max(0) as u64;
        let page_count = page_count.max(0) as u64;
        Some(DatabaseInfo {
            engine_version,
            page_size,
            page_count,
            file_size: page_size * page_count,
            encoding,
        })
    }

    fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn database_type(&self) -> &'static str {
        "SQLite"
    }
}

/// Column names for a statement that produced no rows, from the prepared
/// statement's metadata.
async fn describe_columns(pool: &SqlitePool, sql: &str) -> Vec<String> {
    use sqlx::{Column, Executor};
    match pool.describe(sql).await {
        Ok(described) => described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Decode one row into tagged scalar cells, preserving NULL as a distinct
/// value. SQLite types are per-value, so the runtime storage class decides
/// the decode, not the declared column type.
fn decode_row(row: &SqliteRow) -> Vec<crate::models::Value> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

fn decode_cell(row: &SqliteRow, idx: usize) -> crate::models::Value {
    use crate::models::Value;

    let type_name = match row.try_get_raw(idx) {
        Ok(raw) => {
            if raw.is_null() {
                return Value::Null;
            }
            raw.type_info().name().to_string()
        }
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(idx)
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        "REAL" | "NUMERIC" => row
            .try_get::<f64, _>(idx)
            .map(Value::Real)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(Value::Blob)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}
