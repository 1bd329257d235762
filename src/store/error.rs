//! Document store error types

use thiserror::Error;

/// Errors that can occur in a document store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite operation failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// HTTP request to the hosted store failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Hosted store answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No document with that id in the collection
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Backend misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
