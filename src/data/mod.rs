//! Core data models for the city weather service
//!
//! This module contains the forecast and coordinate types shared by the
//! upstream clients, the cache backends and the forecast service, together
//! with the traits the forecast service uses to talk to upstream APIs.

pub mod geocoding;
pub mod weather;

pub use geocoding::GeocodingClient;
pub use weather::WeatherClient;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the forecast service
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The geocoding API answered successfully but had no match for the name
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// An upstream API could not be reached or answered with garbage
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// A city resolved to a point on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display name reported by the geocoder (e.g. "Paris")
    pub name: String,
}

/// Hourly temperature series, index-aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    /// Timestamps in the upstream ISO-like format (e.g. "2024-07-15T05:00")
    pub time: Vec<String>,
    /// Temperature at 2m above ground in Celsius
    pub temperature_2m: Vec<f64>,
}

impl HourlySeries {
    /// Number of hourly entries
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Returns `true` when both sequences have the same length
    pub fn is_aligned(&self) -> bool {
        self.time.len() == self.temperature_2m.len()
    }

    /// Iterates over `(timestamp, temperature)` pairs
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.time
            .iter()
            .map(String::as_str)
            .zip(self.temperature_2m.iter().copied())
    }
}

/// Forecast for a location; the unit stored in the cache
///
/// Field names mirror the Open-Meteo response so the upstream body can be
/// deserialized directly and the cached JSON stays readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Latitude the forecast was computed for
    pub latitude: f64,
    /// Longitude the forecast was computed for
    pub longitude: f64,
    /// Hourly temperature series
    pub hourly: HourlySeries,
}

/// Maps a city name to coordinates
#[async_trait]
pub trait CoordinateResolver: Send + Sync {
    /// Resolves `city` to coordinates
    ///
    /// # Errors
    /// * `ForecastError::CityNotFound` - the geocoder found no match
    /// * `ForecastError::UpstreamUnavailable` - transport or response failure
    async fn resolve(&self, city: &str) -> Result<Coordinates, ForecastError>;
}

/// Maps coordinates to an hourly temperature forecast
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    /// Fetches the hourly forecast for the given point
    ///
    /// # Errors
    /// * `ForecastError::UpstreamUnavailable` - transport or response failure
    async fn fetch_hourly(&self, latitude: f64, longitude: f64)
        -> Result<Forecast, ForecastError>;
}

/// Builds the HTTP client shared by the upstream API clients
///
/// # Arguments
/// * `timeout` - Per-request timeout applied to every upstream call
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
        .build()
}
