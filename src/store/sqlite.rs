//! SQLite document store
//!
//! Documents are JSON text in a single table keyed by a random UUID.
//! The connection sits behind a mutex; statements are short enough to
//! run inline on the async task.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{Document, DocumentStore, StoreError, StoreResult};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a store at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Self::init(conn)
    }

    /// Private in-memory store
    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_collection ON documents(collection);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn add(&self, collection: &str, document: &serde_json::Value) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let data = serde_json::to_string(document)?;

        self.conn()?.execute(
            "INSERT INTO documents (id, collection, data, created_at) VALUES (?, ?, ?, ?)",
            params![id, collection, data, Utc::now().to_rfc3339()],
        )?;

        Ok(id)
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, data FROM documents WHERE collection = ? ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, data) = row?;
            documents.push(Document {
                id,
                data: serde_json::from_str(&data)?,
            });
        }

        Ok(documents)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &serde_json::Value,
    ) -> StoreResult<()> {
        let fields = fields.as_object().ok_or_else(|| {
            StoreError::Serialization("update fields must be a JSON object".to_string())
        })?;

        let conn = self.conn()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ? AND id = ?",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let existing = existing.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        let mut data: serde_json::Value = serde_json::from_str(&existing)?;
        let target = data.as_object_mut().ok_or_else(|| {
            StoreError::Serialization(format!("stored document {} is not an object", id))
        })?;
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }

        conn.execute(
            "UPDATE documents SET data = ? WHERE collection = ? AND id = ?",
            params![serde_json::to_string(&data)?, collection, id],
        )?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let removed = self.conn()?.execute(
            "DELETE FROM documents WHERE collection = ? AND id = ?",
            params![collection, id],
        )?;

        if removed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
