//! Document store capability used by the transfer pipeline.
//!
//! The pipeline talks to a narrow trait rather than a driver type, exposing
//! only what export/import need: listing names by prefix, a lazy full-scan
//! cursor, idempotent drop, and bulk/single insert. Collections come into
//! existence implicitly on first insert.

use async_trait::async_trait;
use bson::{Document, doc};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use mongodb::Database;
use tracing::debug;

use crate::error::Result;
use crate::paths::NameFilter;

#[cfg(test)]
pub mod memory;

/// Lazy stream of documents from one collection.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Narrow database surface required by the exporter and importer.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// List collection names matching the filter, in stable order.
    async fn collection_names(&self, filter: &NameFilter) -> Result<Vec<String>>;

    /// Open a full-collection cursor yielding every document lazily.
    async fn find_all(&self, collection: &str) -> Result<DocumentStream>;

    /// Drop a collection if it exists; succeeds when the collection is absent.
    async fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Insert documents in one bulk call, returning the inserted count.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64>;

    /// Insert a single document.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;
}

/// Production [`DocumentStore`] backed by a MongoDB database handle.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Name of the underlying database.
    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let names = self
            .db
            .list_collection_names()
            .filter(doc! { "name": name })
            .await?;
        Ok(!names.is_empty())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn collection_names(&self, filter: &NameFilter) -> Result<Vec<String>> {
        let mut names = if filter.matches_all() {
            self.db.list_collection_names().await?
        } else {
            self.db
                .list_collection_names()
                .filter(doc! { "name": { "$regex": filter.to_anchored_regex() } })
                .await?
        };
        names.sort();
        debug!("Found {} matching collections", names.len());
        Ok(names)
    }

    async fn find_all(&self, collection: &str) -> Result<DocumentStream> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .await?;
        Ok(cursor.map_err(Into::into).boxed())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        if self.collection_exists(collection).await? {
            debug!("Dropping existing collection '{}'", collection);
            self.db.collection::<Document>(collection).drop().await?;
        }
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64> {
        if documents.is_empty() {
            return Ok(0);
        }
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_many(documents)
            .await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.db
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;
        Ok(())
    }
}
