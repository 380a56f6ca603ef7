//! Configuration handling for the dbscope CLI.
//!
//! Options come from CLI arguments and environment variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::DEFAULT_PAGE_LIMIT;
use crate::models::DEFAULT_QUERY_TIMEOUT_SECS;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Parser)]
#[command(name = "dbscope", version, about = "Inspect local database files")]
pub struct Config {
    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "DBSCOPE_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "DBSCOPE_JSON_LOGS")]
    pub json_logs: bool,

    /// Query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "DBSCOPE_QUERY_TIMEOUT"
    )]
    pub query_timeout: u32,

    /// Location of the query history file (defaults to the platform data dir)
    #[arg(long, value_name = "FILE", env = "DBSCOPE_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,

    /// Do not record executed statements in the history store
    #[arg(long, env = "DBSCOPE_NO_HISTORY")]
    pub no_history: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List user tables in a database file
    Tables {
        /// Path to the database file
        database: PathBuf,
    },

    /// List views in a database file
    Views {
        database: PathBuf,
    },

    /// Show the full schema of one table
    Schema {
        database: PathBuf,
        table: String,
    },

    /// Page through a table's rows
    Data {
        database: PathBuf,
        table: String,

        /// Rows to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum rows to return
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,

        /// Column to order by
        #[arg(long)]
        order_by: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// Execute an arbitrary SQL statement
    Query {
        database: PathBuf,
        sql: String,
    },

    /// Count the rows in a table
    Count {
        database: PathBuf,
        table: String,
    },

    /// Show engine and file-level information
    Info {
        database: PathBuf,
    },

    /// Show recent query history
    History {
        /// Maximum records to show
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: i64,

        /// Restrict to statements run against one database file
        #[arg(long, value_name = "FILE")]
        database: Option<PathBuf>,

        /// Case-insensitive substring match against query text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show aggregate history statistics
    Stats,

    /// Remove history records
    ClearHistory {
        /// Delete only this record instead of everything
        #[arg(long)]
        id: Option<i64>,
    },
}

impl Config {
    /// The history file to use, falling back to the platform default.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(crate::history::QueryHistory::default_path)
    }
}
