//! Schema-related data models.
//!
//! These are plain value objects produced by schema introspection. They are
//! constructed fresh on each request, never mutated afterwards, and carry no
//! backend-specific handles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type string from the catalog (e.g., `INTEGER`, `VARCHAR(30)`).
    pub data_type: String,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    /// Foreign-key target as `table.column`, when this column references one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

impl ColumnInfo {
    /// Create a new column with no default, key, or reference.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
            is_primary_key: false,
            foreign_key: None,
        }
    }

    /// Set the default value text.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Mark this column as part of the primary key.
    pub fn with_primary_key(mut self, is_pk: bool) -> Self {
        self.is_primary_key = is_pk;
        self
    }

    /// Set the foreign-key target (`table.column`).
    pub fn with_foreign_key(mut self, target: impl Into<String>) -> Self {
        self.foreign_key = Some(target.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    /// Member columns in index-ordinal order. Non-empty for any reported index.
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl IndexInfo {
    /// Create a new index descriptor.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique: false,
        }
    }

    /// Set whether this is a unique index.
    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }
}

/// A single foreign-key column reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
}

impl ForeignKeyInfo {
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }

    /// The `table.column` form used on [`ColumnInfo::foreign_key`].
    pub fn target(&self) -> String {
        format!("{}.{}", self.ref_table, self.ref_column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Columns in catalog declaration order.
    pub columns: Vec<ColumnInfo>,
    /// Names of the primary-key columns. Always agrees with the
    /// `is_primary_key` flags on `columns`.
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub indexes: Vec<IndexInfo>,
    /// Point-in-time row count taken when the schema was read.
    pub row_count: u64,
    /// Raw DDL text, empty when the catalog has none.
    pub ddl: String,
}

impl TableSchema {
    /// Create an empty schema for a table name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            row_count: 0,
            ddl: String::new(),
        }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of columns flagged as primary key, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Backend metadata for a connected database file.
///
/// Optional capability; backends without an equivalent report `None` from
/// [`DatabaseConnector::database_info`](crate::connector::DatabaseConnector::database_info).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Engine version string (e.g., `3.45.1`).
    pub engine_version: String,
    pub page_size: u64,
    pub page_count: u64,
    /// `page_size * page_count`.
    pub file_size: u64,
    pub encoding: String,
}
