//! Open-Meteo geocoding API client
//!
//! Resolves a city name to coordinates. A successful response with no
//! `results` is a legitimate "not found", distinct from a transport failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::{Coordinates, CoordinateResolver, ForecastError};

/// Default base URL for the Open-Meteo geocoding API
pub const GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Response from the geocoding search endpoint
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

/// A single geocoding match
#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Client for the Open-Meteo geocoding API
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http_client: Client,
    base_url: String,
}

impl Default for GeocodingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodingClient {
    /// Create a new GeocodingClient against the public API
    pub fn new() -> Self {
        Self::with_client(Client::new(), GEOCODING_BASE_URL)
    }

    /// Create a new GeocodingClient with a custom HTTP client and base URL
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CoordinateResolver for GeocodingClient {
    async fn resolve(&self, city: &str) -> Result<Coordinates, ForecastError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await
            .map_err(|e| {
                error!(city = %city, error = %e, "geocoding request failed");
                ForecastError::UpstreamUnavailable("Failed to fetch geocoding data".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(city = %city, status = %status, "geocoding API returned an error status");
            return Err(ForecastError::UpstreamUnavailable(format!(
                "Geocoding API returned status {}",
                status
            )));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| {
            error!(city = %city, error = %e, "geocoding response could not be parsed");
            ForecastError::UpstreamUnavailable("Failed to parse geocoding data".to_string())
        })?;

        let result = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ForecastError::CityNotFound(city.to_string()))?;

        debug!(city = %city, name = %result.name, "resolved coordinates");

        Ok(Coordinates {
            latitude: result.latitude,
            longitude: result.longitude,
            name: result.name,
        })
    }
}
