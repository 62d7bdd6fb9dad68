//! MongoDB Import/Export - command-line entry point
//!
//! Moves whole collections between a MongoDB database and a directory of
//! JSON Lines files, and benchmarks the three available execution
//! strategies against each other.
//!
//! # Usage
//!
//! ```bash
//! mongoimex --database measurements export --prefix abc
//! mongoimex --database measurements import --prefix abc
//! mongoimex --database measurements bench --prefix abc
//! ```

use std::time::Duration;

use tracing::Level;

mod bench;
mod cli;
mod codec;
mod config;
mod connection;
mod error;
mod paths;
mod progress;
mod store;
mod strategy;
mod transfer;

use bench::BenchRunner;
use cli::{CliInterface, Command};
use connection::ConnectionManager;
use error::Result;
use store::MongoStore;
use transfer::{Exporter, Importer, TransferSummary};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Connect to MongoDB
/// 4. Run the selected transfer or benchmark
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    let mut manager = ConnectionManager::new(cli.uri(), cli.config().connection.clone());
    manager.connect().await?;

    let result = dispatch(&cli, &manager).await;
    manager.disconnect().await;
    result
}

/// Run the selected subcommand against a connected manager.
async fn dispatch(cli: &CliInterface, manager: &ConnectionManager) -> Result<()> {
    let path_info = cli.path_info();

    match &cli.args().command {
        Command::Export {
            prefix,
            strategy,
            strict,
        } => {
            let store = MongoStore::new(manager.database(&cli.database())?);
            let exporter = Exporter::new(store, path_info)
                .with_reporter(cli.reporter())
                .with_strict(cli.strict(*strict));

            let summary = exporter
                .export(&cli.prefix(prefix.as_deref()), cli.strategy(*strategy))
                .await?;
            print_summary("Export", &summary);
        }
        Command::Import {
            prefix,
            strategy,
            strict,
        } => {
            let store = MongoStore::new(manager.database(&cli.database())?);
            let importer = Importer::new(store, path_info)
                .with_reporter(cli.reporter())
                .with_strict(cli.strict(*strict));

            let summary = importer
                .import(&cli.prefix(prefix.as_deref()), cli.strategy(*strategy))
                .await?;
            print_summary("Import", &summary);
        }
        Command::Bench {
            prefix,
            target_database,
            settle,
        } => {
            let source_db = cli.database();
            let target_db = target_database
                .clone()
                .unwrap_or_else(|| format!("{}Copy", source_db));

            let exporter = Exporter::new(
                MongoStore::new(manager.database(&source_db)?),
                path_info.clone(),
            )
            .with_reporter(cli.reporter());
            let importer = Importer::new(
                MongoStore::new(manager.database(&target_db)?),
                path_info,
            )
            .with_reporter(cli.reporter());

            let settle_secs = settle.unwrap_or(cli.config().transfer.settle_secs);
            let runner = BenchRunner::new(exporter, importer, cli.prefix(prefix.as_deref()))
                .with_settle(Duration::from_secs(settle_secs));

            let report = runner.run().await?;
            print!("{}", report);
        }
    }

    Ok(())
}

/// Print a one-line run summary, or note that the run was skipped.
fn print_summary(direction: &str, summary: &TransferSummary) {
    if summary.skipped {
        println!("{} skipped: precondition not met", direction);
    } else {
        println!(
            "{} finished: {} units, {} records in {:.3} seconds",
            direction,
            summary.units,
            summary.records,
            summary.elapsed.as_secs_f64()
        );
    }
}

/// Initialize the tracing subscriber based on verbosity flags.
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if cli.args().quiet {
        subscriber.with_writer(std::io::sink).init();
    } else {
        subscriber.init();
    }
}
