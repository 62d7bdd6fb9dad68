//! Error handling for transfer operations.
//!
//! This module provides the crate-wide error type with:
//! - One variant family per failure class (connection, config, codec, precondition, I/O, driver)
//! - Automatic conversion from driver and I/O errors
//! - A crate-wide `Result` alias used by all fallible operations

use std::{fmt, io};

/// Crate-wide `Result` type using [`ImexError`] as the error.
///
/// This alias is re-exported at the crate root and is intended to be used
/// throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ImexError>;

/// Top-level error type for transfer operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ImexError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Configuration errors.
    Config(ConfigError),

    /// Record encoding/decoding errors.
    Codec(CodecError),

    /// A required precondition was not met (strict mode only).
    ///
    /// In non-strict mode the same conditions are silent no-ops.
    Precondition(String),

    /// I/O errors from file and directory operations.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Invalid connection URI.
    InvalidUri(String),

    /// Ping command failed during connection verification.
    PingFailed(String),

    /// Not currently connected to MongoDB.
    NotConnected,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Record codec errors.
#[derive(Debug)]
pub enum CodecError {
    /// A document could not be serialized to a line.
    Encode(String),

    /// A line could not be parsed back into a document.
    Decode(String),
}

impl fmt::Display for ImexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImexError::Connection(e) => write!(f, "Connection error: {}", e),
            ImexError::Config(e) => write!(f, "Configuration error: {}", e),
            ImexError::Codec(e) => write!(f, "Codec error: {}", e),
            ImexError::Precondition(msg) => write!(f, "Precondition failed: {}", msg),
            ImexError::Io(e) => write!(f, "I/O error: {}", e),
            ImexError::MongoDb(e) => write!(f, "MongoDB error: {}", e),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            ConnectionError::InvalidUri(uri) => write!(f, "invalid connection URI: {}", uri),
            ConnectionError::PingFailed(msg) => write!(f, "ping failed: {}", msg),
            ConnectionError::NotConnected => write!(f, "not connected"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "config file not found: {}", path),
            ConfigError::InvalidFormat(msg) => write!(f, "invalid config format: {}", msg),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "invalid value for '{}': {}", field, value)
            }
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "encode failed: {}", msg),
            CodecError::Decode(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for ImexError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CodecError {}

impl From<ConnectionError> for ImexError {
    fn from(e: ConnectionError) -> Self {
        ImexError::Connection(e)
    }
}

impl From<ConfigError> for ImexError {
    fn from(e: ConfigError) -> Self {
        ImexError::Config(e)
    }
}

impl From<CodecError> for ImexError {
    fn from(e: CodecError) -> Self {
        ImexError::Codec(e)
    }
}

impl From<io::Error> for ImexError {
    fn from(e: io::Error) -> Self {
        ImexError::Io(e)
    }
}

impl From<mongodb::error::Error> for ImexError {
    fn from(e: mongodb::error::Error) -> Self {
        ImexError::MongoDb(e)
    }
}

impl From<serde_json::Error> for ImexError {
    fn from(e: serde_json::Error) -> Self {
        ImexError::Codec(CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_precondition() {
        let err = ImexError::Precondition("store handle is absent".to_string());
        assert_eq!(
            err.to_string(),
            "Precondition failed: store handle is absent"
        );
    }

    #[test]
    fn test_display_codec() {
        let err = ImexError::from(CodecError::Decode("unexpected end of input".to_string()));
        assert!(err.to_string().contains("decode failed"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: ImexError = io_err.into();
        assert!(matches!(err, ImexError::Io(_)));
    }
}
