//! OpenRouteService REST API Client
//!
//! One `POST` per request, no retries. The upstream body is relayed
//! byte for byte on success.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use super::RoutingService;
use crate::config::RoutingConfig;
use crate::route::Coordinate;

/// HTTP client for the directions endpoint
pub struct RoutingClient {
    client: Client,
    config: RoutingConfig,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest<'a> {
    coordinates: &'a [Coordinate],
}

impl RoutingClient {
    /// Create a new routing client with the given configuration
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Full URL of the GeoJSON directions endpoint for the configured profile
    pub fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }
}

#[async_trait]
impl RoutingService for RoutingClient {
    #[tracing::instrument(skip(self, coordinates), fields(points = coordinates.len()))]
    async fn directions(&self, coordinates: &[Coordinate]) -> Result<Vec<u8>, RoutingError> {
        let mut request = self
            .client
            .post(self.directions_url())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&DirectionsRequest { coordinates });

        if let Some(key) = &self.config.api_key {
            request = request.header(header::AUTHORIZATION, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.as_u16() != 200 {
            let text = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(status = status.as_u16(), "Routing API rejected request");
            return Err(RoutingError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_err() {
            return Err(RoutingError::InvalidBody(
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        tracing::debug!(bytes = body.len(), "Routing API returned directions");
        Ok(body.to_vec())
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Errors that can occur when requesting directions
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream returned a non-JSON body")]
    InvalidBody(String),
}

impl RoutingError {
    /// Raw text to hand back to the caller
    pub fn details(&self) -> String {
        match self {
            RoutingError::Request(e) => e.to_string(),
            RoutingError::Upstream { body, .. } => body.clone(),
            RoutingError::InvalidBody(body) => body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{to_coordinates, Waypoint};
    use crate::test_support::{spawn_slow_upstream, spawn_upstream};
    use axum::http::StatusCode;

    fn config_for(base_url: &str) -> RoutingConfig {
        RoutingConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    fn two_points() -> Vec<Coordinate> {
        to_coordinates(&[Waypoint::new(60.0, 25.0), Waypoint::new(60.2, 25.2)])
    }

    #[test]
    fn test_directions_url() {
        let client = RoutingClient::new(config_for("https://api.openrouteservice.org/")).unwrap();
        assert_eq!(
            client.directions_url(),
            "https://api.openrouteservice.org/v2/directions/foot-walking/geojson"
        );
    }

    #[test]
    fn test_is_configured() {
        let client = RoutingClient::new(RoutingConfig::default()).unwrap();
        assert!(!client.is_configured());

        let client = RoutingClient::new(config_for("http://localhost")).unwrap();
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_sends_coordinates_and_key() {
        let upstream = spawn_upstream(StatusCode::OK, r#"{"type":"FeatureCollection"}"#).await;
        let client = RoutingClient::new(config_for(&upstream.base_url)).unwrap();

        let body = client.directions(&two_points()).await.unwrap();
        assert_eq!(body, br#"{"type":"FeatureCollection"}"#.to_vec());

        let captured = upstream.requests();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].path, "/v2/directions/foot-walking/geojson");
        assert_eq!(captured[0].authorization.as_deref(), Some("test-key"));
        assert_eq!(
            captured[0].body,
            serde_json::json!({"coordinates": [[25.0, 60.0], [25.2, 60.2]]})
        );
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_error() {
        let upstream = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "unavailable").await;
        let client = RoutingClient::new(config_for(&upstream.base_url)).unwrap();

        let err = client.directions(&two_points()).await.unwrap_err();
        match &err {
            RoutingError::Upstream { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.details(), "unavailable");
    }

    #[tokio::test]
    async fn test_non_json_success_is_rejected() {
        let upstream = spawn_upstream(StatusCode::OK, "<html>maintenance</html>").await;
        let client = RoutingClient::new(config_for(&upstream.base_url)).unwrap();

        let err = client.directions(&two_points()).await.unwrap_err();
        assert!(matches!(err, RoutingError::InvalidBody(_)));
        assert_eq!(err.details(), "<html>maintenance</html>");
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // Nothing listens on port 9 of the loopback interface
        let client = RoutingClient::new(config_for("http://127.0.0.1:9")).unwrap();

        let err = client.directions(&two_points()).await.unwrap_err();
        assert!(matches!(err, RoutingError::Request(_)));
        assert!(!err.details().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_sends_no_authorization() {
        let upstream = spawn_upstream(StatusCode::FORBIDDEN, "missing key").await;
        let mut config = config_for(&upstream.base_url);
        config.api_key = None;
        let client = RoutingClient::new(config).unwrap();

        let _ = client.directions(&two_points()).await;
        assert!(upstream.requests()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_timeout_cuts_off_slow_upstream() {
        let upstream =
            spawn_slow_upstream(StatusCode::OK, "{}", Duration::from_secs(5)).await;
        let mut config = config_for(&upstream.base_url);
        config.request_timeout_secs = Some(1);
        let client = RoutingClient::new(config).unwrap();

        let err = client.directions(&two_points()).await.unwrap_err();
        match &err {
            RoutingError::Request(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_timeout_waits_for_slow_upstream() {
        let upstream =
            spawn_slow_upstream(StatusCode::OK, "{}", Duration::from_millis(1500)).await;
        let client = RoutingClient::new(config_for(&upstream.base_url)).unwrap();
        assert!(client.config().request_timeout_secs.is_none());

        let body = client.directions(&two_points()).await.unwrap();
        assert_eq!(body, b"{}".to_vec());
    }
}
