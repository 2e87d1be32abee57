//! Map payloads handed to the rendering collaborator.

use serde::{Deserialize, Serialize};

/// Canonical map query. Sparse: only the fields of the triggering tool are set,
/// the rest are skipped on serialization rather than written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl MapQuery {
    pub fn location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn directions(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn place(place_id: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            ..Self::default()
        }
    }

    /// Center the map on a point.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            lat: Some(coordinates.latitude),
            lng: Some(coordinates.longitude),
            ..Self::default()
        }
    }
}

/// A finite latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
