//! MongoDB Import/Export Pipeline Library
//!
//! This library moves whole MongoDB collections between a database and a
//! directory of JSON Lines files, in both directions, under one of three
//! interchangeable execution strategies.
//!
//! # Modules
//!
//! - `bench`: comparative timing of the execution strategies
//! - `cli`: command-line interface and argument parsing
//! - `codec`: document-per-line record codec
//! - `config`: configuration management
//! - `connection`: MongoDB connection management
//! - `error`: error types and handling
//! - `paths`: working directory derivation, naming, and filtering
//! - `progress`: progress reporting capability
//! - `store`: narrow document store interface and its MongoDB implementation
//! - `strategy`: the three execution strategies
//! - `transfer`: the exporter and importer
//!
//! # Example
//!
//! ```no_run
//! use mongoimex::{
//!     config::ConnectionConfig, connection::ConnectionManager, paths::PathInfo,
//!     store::MongoStore, strategy::Strategy, transfer::Exporter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut manager = ConnectionManager::new(
//!         "mongodb://localhost:27017".to_string(),
//!         ConnectionConfig::default(),
//!     );
//!     manager.connect().await?;
//!
//!     let store = MongoStore::new(manager.database("measurements")?);
//!     let exporter = Exporter::new(store, PathInfo::default());
//!     let summary = exporter.export("", Strategy::Concurrent).await?;
//!     println!("exported {} records", summary.records);
//!
//!     manager.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod bench;
pub mod cli;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod paths;
pub mod progress;
pub mod store;
pub mod strategy;
pub mod transfer;

// Re-export commonly used types
pub use bench::{BenchReport, BenchRunner};
pub use codec::LineCodec;
pub use config::Config;
pub use connection::ConnectionManager;
pub use error::{ImexError, Result};
pub use paths::{NameFilter, PathInfo};
pub use progress::{NoopReporter, ProgressReporter};
pub use store::{DocumentStore, MongoStore};
pub use strategy::Strategy;
pub use transfer::{Exporter, Importer, TransferSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
