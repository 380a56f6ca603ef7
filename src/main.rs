//! dbscope - Main entry point.
//!
//! Command-line front end over the connector layer: opens a database file
//! via the extension registry, runs one operation, and prints the result as
//! JSON. Executed statements are recorded in the query history store unless
//! disabled.

use clap::Parser;
use dbscope::config::{Command, Config};
use dbscope::connector::{ConnectorFactory, DatabaseConnector};
use dbscope::history::QueryHistory;
use dbscope::models::QueryRecord;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn open_connector(
    factory: &ConnectorFactory,
    path: &Path,
) -> Result<Box<dyn DatabaseConnector>, Box<dyn std::error::Error>> {
    let mut connector = factory.create_connector(path)?;
    connector.connect(path).await?;
    info!(
        path = %path.display(),
        backend = connector.database_type(),
        "Opened database"
    );
    Ok(connector)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    let factory = ConnectorFactory::new();
    let history = QueryHistory::new(config.history_path());

    match &config.command {
        Command::Tables { database } => {
            let connector = open_connector(&factory, database).await?;
            print_json(&connector.list_tables().await?)?;
        }

        Command::Views { database } => {
            let connector = open_connector(&factory, database).await?;
            print_json(&connector.list_views().await)?;
        }

        Command::Schema { database, table } => {
            let connector = open_connector(&factory, database).await?;
            print_json(&connector.get_schema(table).await?)?;
        }

        Command::Data {
            database,
            table,
            offset,
            limit,
            order_by,
            desc,
        } => {
            let connector = open_connector(&factory, database).await?;
            let result = connector
                .get_table_data(table, *offset, *limit, order_by.as_deref(), *desc)
                .await;
            print_json(&result)?;
            if !result.success() {
                std::process::exit(1);
            }
        }

        Command::Query { database, sql } => {
            let connector = open_connector(&factory, database).await?;
            let result = connector.execute_query(sql, config.query_timeout).await;

            if !config.no_history {
                let mut record = QueryRecord::new(database.display().to_string(), sql)
                    .with_execution_time(result.execution_time)
                    .with_row_count(result.row_count as i64);
                if let Some(error) = &result.error {
                    record = record.with_error(error);
                }
                if history.add_query(&record).await == dbscope::history::NOT_RECORDED {
                    warn!("Statement was not recorded in history");
                }
            }

            print_json(&result)?;
            if !result.success() {
                std::process::exit(1);
            }
        }

        Command::Count { database, table } => {
            let connector = open_connector(&factory, database).await?;
            println!("{}", connector.get_row_count(table).await);
        }

        Command::Info { database } => {
            let connector = open_connector(&factory, database).await?;
            match connector.database_info().await {
                Some(info) => print_json(&info)?,
                None => {
                    eprintln!("No database information available");
                    std::process::exit(1);
                }
            }
        }

        Command::History {
            limit,
            database,
            search,
        } => {
            let records = match search {
                Some(term) => history.search_history(term, *limit).await?,
                None => {
                    let path = database.as_ref().map(|p| p.display().to_string());
                    history.get_history(*limit, path.as_deref()).await?
                }
            };
            print_json(&records)?;
        }

        Command::Stats => {
            print_json(&history.get_statistics().await?)?;
        }

        Command::ClearHistory { id } => {
            match id {
                Some(id) => {
                    let removed = history.delete_record(*id).await?;
                    println!(
                        "{}",
                        if removed { "deleted 1 record" } else { "no such record" }
                    );
                }
                None => {
                    let removed = history.clear_history().await?;
                    println!("deleted {} records", removed);
                }
            }
        }
    }

    Ok(())
}
