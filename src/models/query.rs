//! Query result data models.
//!
//! Result cells use a tagged scalar [`Value`] rather than a single dynamic
//! type so serialization and display stay deterministic across backends.
//! Execution failures live in [`QueryResult::error`] - never in a raised
//! fault - so one call site can branch on success uniformly.

use serde::{Deserialize, Serialize};

/// Default page size for table data requests.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 30;

/// Maximum query timeout in seconds.
pub const MAX_QUERY_TIMEOUT_SECS: u32 = 300;

/// Synthetic column name carrying the mutation count of write statements.
pub const AFFECTED_ROWS_COLUMN: &str = "affected_rows";

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Binary data (base64 encoded in JSON).
    #[serde(with = "base64_bytes")]
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this cell is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the storage-class name of this cell for display.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Blob(v) => write!(f, "<blob {} bytes>", v.len()),
        }
    }
}

/// Custom serialization for binary data as base64.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    /// Rows of fixed arity matching `columns`.
    pub rows: Vec<Vec<Value>>,
    /// Returned row count for reads; affected row count for writes.
    pub row_count: u64,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
    /// Set exactly when the statement failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Create a successful read result.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>, execution_time: f64) -> Self {
        let row_count = rows.len() as u64;
        Self {
            columns,
            rows,
            row_count,
            execution_time,
            error: None,
        }
    }

    /// Create a successful write result carrying the mutation count in the
    /// single synthetic `affected_rows` column.
    pub fn write(affected_rows: u64, execution_time: f64) -> Self {
        Self {
            columns: vec![AFFECTED_ROWS_COLUMN.to_string()],
            rows: vec![vec![Value::Integer(affected_rows as i64)]],
            row_count: affected_rows,
            execution_time,
            error: None,
        }
    }

    /// Create a failed result carrying the engine's message verbatim.
    pub fn failure(error: impl Into<String>, execution_time: f64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            execution_time,
            error: Some(error.into()),
        }
    }

    /// Success is defined as `error == None`, never as `row_count > 0`.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
