//! Configuration management for mongoimex.
//!
//! Configuration is loaded from a TOML file and overridden by environment
//! variables and command-line arguments.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables (`MONGOIMEX_URI`, `MONGOIMEX_DATABASE`)
//! 3. Configuration file
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::paths::PathInfo;
use crate::strategy::Strategy;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Path configuration for the working directory and files.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Transfer behavior configuration.
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Connection-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Default MongoDB connection URI.
    #[serde(default = "default_uri")]
    pub default_uri: String,

    /// Default database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Connection timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Working directory and file naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory under which working directories are created.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Working directory base name. Defaults to a dated `Export <date>` name.
    #[serde(default)]
    pub dir_name: Option<String>,

    /// File extension without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Transfer behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Default execution strategy.
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    /// Default collection/file name prefix filter.
    #[serde(default)]
    pub prefix: String,

    /// Error on missing preconditions instead of silently skipping.
    #[serde(default)]
    pub strict: bool,

    /// Seconds to wait between benchmark strategies, letting the OS settle
    /// outstanding I/O before the next measurement.
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply
    /// environment overrides.
    ///
    /// # Arguments
    /// * `path` - Config file path; `None` uses defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|_| {
                    ConfigError::FileNotFound(path.display().to_string())
                })?;
                toml::from_str(&contents)
                    .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override file/default values from the environment.
    fn apply_env(&mut self) {
        if let Ok(uri) = std::env::var("MONGOIMEX_URI") {
            self.connection.default_uri = uri;
        }
        if let Ok(database) = std::env::var("MONGOIMEX_DATABASE") {
            self.connection.database = database;
        }
    }
}

impl PathsConfig {
    /// Resolve to the immutable path information used by a run.
    pub fn to_path_info(&self) -> PathInfo {
        let defaults = PathInfo::default();
        PathInfo::new(
            self.root.clone().unwrap_or(defaults.root_path),
            self.dir_name.clone().unwrap_or(defaults.working_dir_name),
            &self.extension,
        )
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_uri: default_uri(),
            database: default_database(),
            timeout: default_timeout(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: None,
            dir_name: None,
            extension: default_extension(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            prefix: String::new(),
            strict: false,
            settle_secs: default_settle(),
        }
    }
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "test".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_strategy() -> Strategy {
    Strategy::Concurrent
}

fn default_settle() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.default_uri, "mongodb://localhost:27017");
        assert_eq!(config.transfer.strategy, Strategy::Concurrent);
        assert!(!config.transfer.strict);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            database = "measurements"

            [paths]
            root = "/data/exports"
            extension = "jsonl"

            [transfer]
            strategy = "imperative-streaming"
            strict = true
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.database, "measurements");
        assert_eq!(config.connection.timeout, 30);
        assert_eq!(config.transfer.strategy, Strategy::ImperativeStreaming);
        assert!(config.transfer.strict);

        let info = config.paths.to_path_info();
        assert_eq!(info.root_path, PathBuf::from("/data/exports"));
        assert_eq!(info.file_extension, "jsonl");
    }

    #[test]
    fn test_missing_config_file_errors() {
        let result = Config::load(Some(Path::new("/nonexistent/mongoimex.toml")));
        assert!(matches!(
            result,
            Err(crate::error::ImexError::Config(ConfigError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_path_info_uses_dated_default_dir_name() {
        let config = PathsConfig {
            root: Some(PathBuf::from("/tmp")),
            dir_name: None,
            extension: "json".to_string(),
        };
        let info = config.to_path_info();
        assert!(info.working_dir_name.starts_with("Export "));
    }
}
