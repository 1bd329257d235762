//! Upstream Routing Integration
//!
//! Route computation is delegated to the OpenRouteService directions
//! API. This module owns the HTTP client that talks to it and the
//! trait the API layer depends on, so handlers can be exercised
//! against a stand-in service.

mod client;

pub use client::{RoutingClient, RoutingError};

use async_trait::async_trait;

use crate::route::Coordinate;

/// A service that turns an ordered coordinate list into a route
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Request walking directions through `coordinates`.
    ///
    /// Returns the raw JSON body of a successful upstream response.
    async fn directions(&self, coordinates: &[Coordinate]) -> Result<Vec<u8>, RoutingError>;

    /// Whether credentials for the upstream service are present
    fn is_configured(&self) -> bool;
}
