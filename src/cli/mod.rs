//! Command-line interface for mongoimex.
//!
//! This module handles:
//! - Argument parsing using clap
//! - Configuration loading and CLI-over-config resolution
//! - Selection of the progress reporter for a run

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::paths::PathInfo;
use crate::progress::{ConsoleReporter, NoopReporter, ProgressReporter, SpinnerReporter};
use crate::strategy::Strategy;

/// MongoDB collection <-> JSON Lines directory transfer tool
#[derive(Parser, Debug)]
#[command(
    name = "mongoimex",
    version,
    about = "Move MongoDB collections to and from a directory of JSON Lines files",
    long_about = "Exports matching collections to one JSON Lines file each, imports them \
back with drop-then-create semantics, and benchmarks the three available \
execution strategies against each other."
)]
pub struct CliArgs {
    /// MongoDB connection URI
    ///
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Database name to use
    #[arg(short = 'd', long, value_name = "NAME")]
    pub database: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Root directory for working directories
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Working directory base name
    #[arg(long = "dir-name", value_name = "NAME")]
    pub dir_name: Option<String>,

    /// File extension, without the leading dot
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Show an animated spinner instead of plain progress lines
    #[arg(long)]
    pub spinner: bool,

    /// Quiet mode (no progress output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Transfer subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export matching collections to one JSON Lines file each
    Export {
        /// Collection name prefix filter (empty selects all)
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Execution strategy
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<Strategy>,

        /// Error on missing preconditions instead of silently skipping
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_name = "BOOL")]
        strict: Option<bool>,
    },

    /// Import files from the working directory, recreating one collection per file
    Import {
        /// File name prefix filter (empty selects all)
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Execution strategy
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<Strategy>,

        /// Error on missing preconditions instead of silently skipping
        #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_name = "BOOL")]
        strict: Option<bool>,
    },

    /// Run export-then-import under every strategy and compare timings
    Bench {
        /// Collection name prefix filter for the benchmark workload
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Destination database for the import leg (default: `<database>Copy`)
        #[arg(long = "target-database", value_name = "NAME")]
        target_database: Option<String>,

        /// Seconds to wait between strategies
        #[arg(long, value_name = "SECONDS")]
        settle: Option<u64>,
    },
}

/// Parsed arguments combined with loaded configuration.
pub struct CliInterface {
    args: CliArgs,
    config: Config,
}

impl CliInterface {
    /// Parse arguments and load configuration.
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Config::load(args.config_file.as_deref())?;
        Ok(Self { args, config })
    }

    /// Build from pre-parsed parts (used by tests).
    pub fn from_parts(args: CliArgs, config: Config) -> Self {
        Self { args, config }
    }

    /// Parsed command-line arguments.
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Effective connection URI (CLI over config).
    pub fn uri(&self) -> String {
        self.args
            .uri
            .clone()
            .unwrap_or_else(|| self.config.connection.default_uri.clone())
    }

    /// Effective database name (CLI over config).
    pub fn database(&self) -> String {
        self.args
            .database
            .clone()
            .unwrap_or_else(|| self.config.connection.database.clone())
    }

    /// Effective path information (CLI overrides applied field by field).
    pub fn path_info(&self) -> PathInfo {
        let base = self.config.paths.to_path_info();
        PathInfo::new(
            self.args.root.clone().unwrap_or(base.root_path),
            self.args.dir_name.clone().unwrap_or(base.working_dir_name),
            self.args
                .extension
                .as_deref()
                .unwrap_or(&base.file_extension),
        )
    }

    /// Effective prefix filter (CLI over config).
    pub fn prefix(&self, arg: Option<&str>) -> String {
        arg.map(str::to_string)
            .unwrap_or_else(|| self.config.transfer.prefix.clone())
    }

    /// Effective execution strategy (CLI over config).
    pub fn strategy(&self, arg: Option<Strategy>) -> Strategy {
        arg.unwrap_or(self.config.transfer.strategy)
    }

    /// Effective strict-mode setting (CLI over config).
    pub fn strict(&self, arg: Option<bool>) -> bool {
        arg.unwrap_or(self.config.transfer.strict)
    }

    /// Progress reporter for the run, per the output flags.
    pub fn reporter(&self) -> Arc<dyn ProgressReporter> {
        if self.args.quiet {
            Arc::new(NoopReporter)
        } else if self.args.spinner {
            Arc::new(SpinnerReporter::new())
        } else {
            Arc::new(ConsoleReporter::new())
        }
    }
}
