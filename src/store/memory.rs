//! In-memory [`DocumentStore`] used by pipeline tests.

use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::Document;
use futures::stream::{self, StreamExt};

use super::{DocumentStore, DocumentStream};
use crate::error::Result;
use crate::paths::NameFilter;

/// Test double storing collections in a mutex-guarded map.
///
/// `poison_drop` injects a drop failure for one collection, used to verify
/// that a failing unit does not abort its siblings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    poisoned: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with documents.
    pub fn seed(&self, name: &str, docs: Vec<Document>) {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), docs);
    }

    /// Make every `drop_collection` call for `name` fail.
    pub fn poison_drop(&self, name: &str) {
        *self.poisoned.lock().unwrap() = Some(name.to_string());
    }

    /// Snapshot of one collection's documents.
    pub fn documents(&self, name: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// All collection names currently present.
    pub fn names(&self) -> Vec<String> {
        self.collections.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collection_names(&self, filter: &NameFilter) -> Result<Vec<String>> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .keys()
            .filter(|name| filter.matches(name))
            .cloned()
            .collect())
    }

    async fn find_all(&self, collection: &str) -> Result<DocumentStream> {
        let docs = self.documents(collection);
        Ok(stream::iter(docs.into_iter().map(Ok)).boxed())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        if self.poisoned.lock().unwrap().as_deref() == Some(collection) {
            return Err(io::Error::other(format!("injected drop failure for '{}'", collection)).into());
        }
        self.collections.lock().unwrap().remove(collection);
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64> {
        let count = documents.len() as u64;
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(count)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }
}
