//! Route Data Types
//!
//! Waypoints as the client sends them, coordinates as the routing API
//! expects them, and the route record shape stored by the seeder.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair identifying a point on a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Upstream wire form of a waypoint: `[longitude, latitude]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(pub [f64; 2]);

impl Coordinate {
    pub fn longitude(&self) -> f64 {
        self.0[0]
    }

    pub fn latitude(&self) -> f64 {
        self.0[1]
    }
}

impl From<Waypoint> for Coordinate {
    fn from(wp: Waypoint) -> Self {
        Coordinate([wp.longitude, wp.latitude])
    }
}

/// Convert waypoints into routing coordinates, preserving order
pub fn to_coordinates(waypoints: &[Waypoint]) -> Vec<Coordinate> {
    waypoints.iter().copied().map(Coordinate::from).collect()
}

/// A named route as stored in the `routes` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub name: String,
    pub waypoints: Vec<Waypoint>,
    pub path: Vec<Waypoint>,
}
