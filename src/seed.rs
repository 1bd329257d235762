//! Route Seeding
//!
//! Pushes a fixed list of route records into a document collection,
//! one insert per record, in order. Nothing is checked for existing
//! copies, so seeding twice stores every record twice. The first
//! failed insert stops the run.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::route::{RouteRecord, Waypoint};
use crate::store::{DocumentStore, StoreError};

/// The built-in seed data
pub fn default_routes() -> Vec<RouteRecord> {
    vec![RouteRecord {
        name: String::new(),
        waypoints: vec![Waypoint::new(60.0, 25.0), Waypoint::new(60.2, 25.2)],
        path: vec![Waypoint::new(60.15, 25.15), Waypoint::new(60.18, 25.18)],
    }]
}

/// Load seed records from a JSON array file
pub fn load_routes(path: &Path) -> Result<Vec<RouteRecord>, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|e| SeedError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| SeedError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Insert every record into `collection`, returning the new document ids
pub async fn seed_routes(
    store: &dyn DocumentStore,
    collection: &str,
    routes: &[RouteRecord],
) -> Result<Vec<String>, SeedError> {
    let mut ids = Vec::with_capacity(routes.len());

    for (index, route) in routes.iter().enumerate() {
        let document = serde_json::to_value(route)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let id = store
            .add(collection, &document)
            .await
            .map_err(|source| SeedError::Insert { index, source })?;

        tracing::debug!(collection, id = %id, name = %route.name, "Inserted route");
        ids.push(id);
    }

    tracing::info!(
        collection,
        backend = store.name(),
        count = ids.len(),
        "Routes uploaded"
    );

    Ok(ids)
}

/// Merge a JSON object of top-level fields into a stored route
pub async fn update_route(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    fields: &str,
) -> Result<(), SeedError> {
    let fields: serde_json::Value =
        serde_json::from_str(fields).map_err(|e| SeedError::InvalidFields(e.to_string()))?;
    if !fields.is_object() {
        return Err(SeedError::InvalidFields(
            "expected a JSON object of fields".to_string(),
        ));
    }

    store.update(collection, id, &fields).await?;
    tracing::info!(collection, id, "Route updated");
    Ok(())
}

/// Remove a stored route
pub async fn delete_route(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<(), SeedError> {
    store.delete(collection, id).await?;
    tracing::info!(collection, id, "Route deleted");
    Ok(())
}

/// Errors that can occur while seeding
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse seed file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Insert of record {index} failed: {source}")]
    Insert {
        index: usize,
        #[source]
        source: StoreError,
    },

    #[error("Invalid update fields: {0}")]
    InvalidFields(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
