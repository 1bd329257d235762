//! Document Store
//!
//! A minimal document-database surface: add, list, update and delete
//! JSON documents in named collections. Two backends:
//!
//! - [`FirestoreStore`]: the hosted Cloud Firestore REST API
//! - [`SqliteStore`]: a local SQLite file, for development and tests
//!
//! Adding never deduplicates; each call creates a new document with a
//! fresh id.

mod error;
mod firestore;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{StoreBackend, StoreConfig};

/// A stored document and its id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

/// Common trait for all document store backends
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Insert a new document, returning its generated id
    async fn add(&self, collection: &str, document: &serde_json::Value) -> StoreResult<String>;

    /// All documents in a collection
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Merge top-level fields of `fields` into an existing document
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &serde_json::Value,
    ) -> StoreResult<()>;

    /// Remove a document
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Open the backend selected in the configuration
pub fn open(config: &StoreConfig) -> StoreResult<Box<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.sqlite_path)?)),
        StoreBackend::Firestore => Ok(Box::new(FirestoreStore::new(config.firestore.clone())?)),
    }
}
