use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocodingConfig;
use crate::geo::GeoPoint;

/// Errors from the maps vendor
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Geocoding API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Geocoding response missing coordinates")]
    MalformedResponse,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// A resolved address
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub formatted: String,
    pub point: GeoPoint,
}

/// Forward-geocoding client for the maps vendor
pub struct GeocodingClient {
    client: Client,
    config: GeocodingConfig,
}

impl GeocodingClient {
    pub fn new(config: GeocodingConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.api.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Resolve a free-form address query to its best candidate
    ///
    /// Returns None when the vendor finds nothing.
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodingError> {
        let url = format!("{}/geocode/json", self.config.api.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("address", query), ("key", self.config.api.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodingError::Status(response.status()));
        }

        let body: GeocodeResponse = response.json().await?;

        let Some(first) = body.results.into_iter().next() else {
            return Ok(None);
        };

        let point = GeoPoint::new(first.geometry.location.lat, first.geometry.location.lng)
            .ok_or(GeocodingError::MalformedResponse)?;

        Ok(Some(GeocodedAddress {
            formatted: first.formatted_address,
            point,
        }))
    }
}
