//! Application wiring for the city weather service
//!
//! Builds the upstream clients, the cache backend, the forecast service and
//! the controller from a [`ServiceConfig`], and exposes a single request
//! handler for the server loop.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::cache::{open_store, CacheError};
use crate::cli::ServiceConfig;
use crate::controller::WeatherController;
use crate::data::{build_http_client, GeocodingClient, WeatherClient};
use crate::forecast::ForecastService;
use crate::http::{Request, Response};

/// Errors that can occur while assembling the application
#[derive(Debug, Error)]
pub enum AppError {
    /// The shared HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured cache backend could not be opened
    #[error("failed to open cache: {0}")]
    Cache(#[from] CacheError),
}

/// The assembled service
#[derive(Clone)]
pub struct App {
    controller: WeatherController,
}

impl App {
    /// Builds every component from the configuration
    ///
    /// The cache backend is opened but not contacted; an unreachable cache
    /// does not prevent startup.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AppError> {
        let http_client = build_http_client(config.upstream.request_timeout)?;
        let geocoder = GeocodingClient::with_client(
            http_client.clone(),
            config.upstream.geocoding_url.clone(),
        );
        let weather = WeatherClient::with_client(http_client, config.upstream.forecast_url.clone());
        let cache = open_store(&config.cache)?;

        info!(
            backend = ?config.cache.backend,
            ttl_secs = config.cache.ttl.as_secs(),
            geocoding_url = %config.upstream.geocoding_url,
            forecast_url = %config.upstream.forecast_url,
            "service configured"
        );

        let service = ForecastService::new(Arc::new(geocoder), Arc::new(weather), cache, &config.cache);
        Ok(Self {
            controller: WeatherController::new(service),
        })
    }

    /// Handles one HTTP request
    pub async fn handle(&self, request: Request) -> Response {
        self.controller.route(request).await
    }
}
