//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses. Bodies are flat `{"error": ..., "details": ...}`
//! objects, the shape existing clients of `/get_route` parse.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::routing::RoutingError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Fewer than two waypoints supplied
    #[error("Need at least 2 points")]
    InsufficientWaypoints,

    /// Body is not JSON or has the wrong shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A waypoint entry is missing a coordinate or is not numeric
    #[error("waypoint {index}: {reason}")]
    InvalidWaypoint { index: usize, reason: String },

    /// Any failure talking to the routing service
    #[error("Route request failed: {0}")]
    RouteFailed(#[from] RoutingError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        let (status, error, details) = match self {
            ApiError::InsufficientWaypoints => {
                (StatusCode::BAD_REQUEST, "Need at least 2 points", None)
            }
            ApiError::InvalidBody(msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(msg.clone()),
            ),
            ApiError::InvalidWaypoint { .. } => (
                StatusCode::BAD_REQUEST,
                "Invalid waypoint",
                Some(self.to_string()),
            ),
            ApiError::RouteFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Route request failed",
                Some(e.details()),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                Some(msg.clone()),
            ),
            ApiError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                Some(e.to_string()),
            ),
        };

        (
            status,
            ErrorResponse {
                error: error.to_string(),
                details,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "Rejected request"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let (status, body) = err.status_and_body();
        (status, serde_json::to_value(body).unwrap())
    }

    #[test]
    fn test_insufficient_waypoints_has_no_details() {
        let (status, body) = body_json(ApiError::InsufficientWaypoints);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Need at least 2 points"}));
    }

    #[test]
    fn test_route_failed_carries_upstream_text() {
        let err = ApiError::from(RoutingError::Upstream {
            status: 403,
            body: "Access to this API has been disallowed".to_string(),
        });
        let (status, body) = body_json(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Route request failed",
                "details": "Access to this API has been disallowed"
            })
        );
    }

    #[test]
    fn test_invalid_waypoint_details() {
        let err = ApiError::InvalidWaypoint {
            index: 1,
            reason: "missing field `longitude`".to_string(),
        };
        let (status, body) = body_json(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "waypoint 1: missing field `longitude`");
    }
}
