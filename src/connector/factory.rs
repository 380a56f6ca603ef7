//! Connector registry.
//!
//! Maps file extensions to connector constructors so callers can obtain a
//! backend from a path alone. New backends register an extension list and a
//! constructor; nothing else in the crate changes.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::connector::sqlite::{SqliteConnector, SQLITE_EXTENSIONS};
use crate::connector::DatabaseConnector;
use crate::error::{DbError, DbResult};

/// Constructor for a backend connector, stored in the registry.
pub type ConnectorCtor = fn() -> Box<dyn DatabaseConnector>;

pub struct ConnectorFactory {
    // BTreeMap keeps extension listings in a stable order for messages
    registry: BTreeMap<String, ConnectorCtor>,
}

impl ConnectorFactory {
    /// A factory with the built-in backends registered.
    pub fn new() -> Self {
        let mut factory = Self {
            registry: BTreeMap::new(),
        };
        factory.register(SQLITE_EXTENSIONS, || Box::new(SqliteConnector::new()));
        factory
    }

    /// Register a constructor for a set of extensions. Extensions are stored
    /// lowercase with the leading dot; later registrations win.
    pub fn register(&mut self, extensions: &[&str], constructor: ConnectorCtor) {
        for ext in extensions {
            let normalized = if ext.starts_with('.') {
                ext.to_lowercase()
            } else {
                format!(".{}", ext.to_lowercase())
            };
            self.registry.insert(normalized, constructor);
        }
    }

    /// Build a connector for the given path based on its extension. The
    /// returned connector is not yet connected.
    pub fn create_connector(&self, path: &Path) -> DbResult<Box<dyn DatabaseConnector>> {
        let extension = Self::extension_of(path);
        match self.registry.get(&extension) {
            Some(constructor) => {
                debug!(path = %path.display(), extension, "Creating connector");
                Ok(constructor())
            }
            None => Err(DbError::unsupported(
                extension,
                self.supported_extensions().join(", "),
            )),
        }
    }

    /// Whether any registered backend handles this path's extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        self.registry.contains_key(&Self::extension_of(path))
    }

    /// Backend type label for a path without connecting. A lookup only; the
    /// transient connector instance is discarded.
    pub fn database_type(&self, path: &Path) -> DbResult<&'static str> {
        self.create_connector(path).map(|c| c.database_type())
    }

    /// All registered extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<String> {
        self.registry.keys().cloned().collect()
    }

    /// A combined glob description for file-selection dialogs, e.g.
    /// `Database files (*.db *.sqlite *.sqlite3)`.
    pub fn file_filter(&self) -> String {
        let globs: Vec<String> = self.registry.keys().map(|e| format!("*{}", e)).collect();
        format!("Database files ({})", globs.join(" "))
    }

    /// The full `;;`-joined dialog filter list: the combined filter, one
    /// entry per backend, and an all-files fallback.
    pub fn all_filters(&self) -> String {
        let mut by_backend: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for (ext, constructor) in &self.registry {
            by_backend
                .entry(constructor().database_type())
                .or_default()
                .push(format!("*{}", ext));
        }

        let mut filters = vec![self.file_filter()];
        for (backend, globs) in by_backend {
            filters.push(format!("{} ({})", backend, globs.join(" ")));
        }
        filters.push("All Files (*)".to_string());
        filters.join(";;")
    }

    fn extension_of(path: &Path) -> String {
        path.extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

impl Default for ConnectorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_extensions_registered() {
        let factory = ConnectorFactory::new();
        for ext in ["db", "sqlite", "sqlite3"] {
            let path = format!("data.{}", ext);
            assert!(factory.is_supported(Path::new(&path)), "{}", path);
        }
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let factory = ConnectorFactory::new();
        assert!(factory.is_supported(Path::new("DATA.DB")));
        assert!(factory.is_supported(Path::new("data.SQLite3")));
    }

    #[test]
    fn test_create_connector_for_sqlite() {
        let factory = ConnectorFactory::new();
        let connector = factory.create_connector(Path::new("app.sqlite")).unwrap();
        assert_eq!(connector.database_type(), "SQLite");
        assert!(!connector.is_connected());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let factory = ConnectorFactory::new();
        let Err(err) = factory.create_connector(Path::new("data.csv")) else {
            panic!("expected an unsupported-database error");
        };
        assert!(matches!(err, DbError::UnsupportedDatabase { .. }));
        let message = err.to_string();
        assert!(message.contains(".csv"));
        assert!(message.contains(".sqlite3"));
    }

    #[test]
    fn test_no_extension_is_rejected() {
        let factory = ConnectorFactory::new();
        assert!(!factory.is_supported(Path::new("data")));
        assert!(factory.create_connector(Path::new("data")).is_err());
    }

    #[test]
    fn test_register_normalizes_extension() {
        let mut factory = ConnectorFactory::new();
        factory.register(&["DuckDB"], || Box::new(SqliteConnector::new()));
        assert!(factory.is_supported(Path::new("data.duckdb")));
    }

    #[test]
    fn test_database_type_lookup() {
        let factory = ConnectorFactory::new();
        assert_eq!(factory.database_type(Path::new("a.db")).unwrap(), "SQLite");
        assert!(factory.database_type(Path::new("a.csv")).is_err());
    }

    #[test]
    fn test_file_filter_lists_globs() {
        let factory = ConnectorFactory::new();
        let filter = factory.file_filter();
        assert!(filter.starts_with("Database files ("));
        assert!(filter.contains("*.db"));
        assert!(filter.contains("*.sqlite3"));
    }

    #[test]
    fn test_all_filters_sections() {
        let factory = ConnectorFactory::new();
        let filters = factory.all_filters();
        let sections: Vec<&str> = filters.split(";;").collect();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].starts_with("Database files ("));
        assert_eq!(sections[1], "SQLite (*.db *.sqlite *.sqlite3)");
        assert_eq!(sections[2], "All Files (*)");
    }

    #[test]
    fn test_supported_extensions_sorted() {
        let factory = ConnectorFactory::new();
        let exts = factory.supported_extensions();
        let mut sorted = exts.clone();
        sorted.sort();
        assert_eq!(exts, sorted);
        assert!(exts.contains(&".db".to_string()));
    }
}
