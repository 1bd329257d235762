//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /get_route`
///
/// Entries are kept as raw JSON so the waypoint count can be checked
/// before any entry is interpreted.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub waypoints: Vec<serde_json::Value>,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Whether an API key for the routing service is configured
    pub upstream_configured: bool,
    pub uptime_seconds: u64,
    pub version: String,
}
