//! # Trailhead
//!
//! Backend pieces for a hiking app: a proxy that turns a list of
//! waypoints into walking directions via the OpenRouteService API, and
//! a seeding tool that loads route records into a document database.
//!
//! ## Modules
//!
//! - [`api`]: `POST /get_route` proxy server with Axum
//! - [`routing`]: OpenRouteService directions client
//! - [`store`]: Document store backends (Firestore REST, SQLite)
//! - [`seed`]: Route seeding
//! - [`route`]: Waypoint and route record types
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trailhead::{api, config::Config, routing::RoutingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let routing = Arc::new(RoutingClient::new(config.routing.clone())?);
//!
//!     api::serve(api::AppState::new(routing), &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod route;
pub mod routing;
pub mod seed;
pub mod store;

#[cfg(test)]
mod test_support;

pub use api::{build_router, serve, ApiError, AppState};
pub use config::{Config, ConfigError};
pub use route::{Coordinate, RouteRecord, Waypoint};
pub use routing::{RoutingClient, RoutingError, RoutingService};
pub use seed::{default_routes, seed_routes, SeedError};
pub use store::{Document, DocumentStore, FirestoreStore, SqliteStore, StoreError};
