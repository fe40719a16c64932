//! Address-to-coordinate lookup.
//!
//! Only the admin shop form needs this. [`GsiGeocoder`] queries the GSI
//! address-search endpoint, which answers with a JSON array of features
//! whose `geometry.coordinates` are `[longitude, latitude]`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::GeoPoint;
use crate::error::MeshimapError;

/// Resolves free-text addresses to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + std::fmt::Debug {
    /// Returns the best match for `address`, or `Ok(None)` if the service
    /// knows no such place.
    async fn locate(&self, address: &str) -> Result<Option<GeoPoint>, MeshimapError>;
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// HTTP client for the GSI address-search API.
#[derive(Debug, Clone)]
pub struct GsiGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl GsiGeocoder {
    /// Creates a client for `endpoint` with a per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Geocoder`] if the HTTP client cannot be
    /// built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, MeshimapError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("meshimap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MeshimapError::Geocoder(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

/// Picks the first feature's position. Coordinates arrive as
/// `[longitude, latitude]`.
fn first_point(features: &[Feature]) -> Option<GeoPoint> {
    let coords = &features.first()?.geometry.coordinates;
    match coords.as_slice() {
        [longitude, latitude, ..] => Some(GeoPoint {
            latitude: *latitude,
            longitude: *longitude,
        }),
        _ => None,
    }
}

#[async_trait]
impl Geocoder for GsiGeocoder {
    async fn locate(&self, address: &str) -> Result<Option<GeoPoint>, MeshimapError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let url = reqwest::Url::parse_with_params(&self.endpoint, &[("q", address)])
            .map_err(|e| MeshimapError::Geocoder(format!("bad endpoint: {e}")))?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MeshimapError::Geocoder(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MeshimapError::Geocoder(format!(
                "address search returned {status}"
            )));
        }

        let features: Vec<Feature> = resp
            .json()
            .await
            .map_err(|e| MeshimapError::Geocoder(e.to_string()))?;

        let point = first_point(&features);
        tracing::debug!(address, found = point.is_some(), "geocoded address");
        Ok(point)
    }
}
