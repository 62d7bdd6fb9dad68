//! Connection management for MongoDB.
//!
//! This module provides connection establishment and teardown for the
//! transfer pipeline: URI parsing, timeout configuration, and a
//! ping-verified connect. The pipeline itself never sees the client, only
//! database handles obtained here.

use std::time::Duration;

use bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result};

/// MongoDB connection manager.
///
/// Holds the client for the lifetime of a run and hands out database
/// handles. A manager that never connected yields no handles, which maps to
/// the pipeline's "absent store" precondition.
pub struct ConnectionManager {
    /// MongoDB client instance, present once connected.
    client: Option<Client>,

    /// Connection configuration.
    config: ConnectionConfig,

    /// Connection URI.
    uri: String,
}

impl ConnectionManager {
    /// Create a new connection manager.
    ///
    /// # Arguments
    /// * `uri` - MongoDB connection URI
    /// * `config` - Connection configuration
    pub fn new(uri: String, config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            uri,
        }
    }

    /// Establish and verify a connection to MongoDB.
    ///
    /// Parses the URI, applies the configured timeout and application name,
    /// and pings the server so connection failures surface here rather than
    /// on the first transfer operation.
    pub async fn connect(&mut self) -> Result<()> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri(format!("{}: {}", self.uri, e)))?;

        options.app_name = Some("mongoimex".to_string());
        options.connect_timeout = Some(Duration::from_secs(self.config.timeout));
        options.server_selection_timeout = Some(Duration::from_secs(self.config.timeout));

        let client = Client::with_options(options)
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        debug!("Pinging server to verify connection");
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectionError::PingFailed(e.to_string()))?;

        info!("Connected to MongoDB");
        self.client = Some(client);
        Ok(())
    }

    /// Disconnect from MongoDB, releasing pooled connections.
    pub async fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("Disconnected from MongoDB");
        }
    }

    /// Whether a verified connection is held.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Get a database handle.
    ///
    /// # Arguments
    /// * `name` - Database name
    pub fn database(&self, name: &str) -> Result<Database> {
        self.client
            .as_ref()
            .map(|client| client.database(name))
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }
}
