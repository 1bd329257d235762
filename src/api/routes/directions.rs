//! Directions Route
//!
//! - POST /get_route - Walking directions through a list of waypoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::RouteRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::route::{to_coordinates, Waypoint};

/// Minimum number of waypoints a route needs
pub const MIN_WAYPOINTS: usize = 2;

/// POST /get_route
///
/// Forwards the waypoints to the routing service as `[lon, lat]` pairs
/// and relays its GeoJSON response unchanged.
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let waypoints = parse_waypoints(req.waypoints)?;
    let coordinates = to_coordinates(&waypoints);

    tracing::debug!(points = coordinates.len(), "Requesting directions");

    let body = state.routing.directions(&coordinates).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Check the count first, then interpret each entry
fn parse_waypoints(raw: Vec<serde_json::Value>) -> ApiResult<Vec<Waypoint>> {
    if raw.len() < MIN_WAYPOINTS {
        return Err(ApiError::InsufficientWaypoints);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| ApiError::InvalidWaypoint {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
