//! dbscope Library
//!
//! This library provides a pluggable introspection layer over local database
//! files: a connector contract for schema discovery and query execution, a
//! SQLite backend, an extension-based connector registry, and a persistent
//! query history store.

pub mod config;
pub mod connector;
pub mod error;
pub mod history;
pub mod models;

pub use config::Config;
pub use connector::{ConnectorFactory, DatabaseConnector, SqliteConnector};
pub use error::{DbError, DbResult};
pub use history::QueryHistory;
