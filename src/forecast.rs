//! Forecast retrieval with cache-aside semantics
//!
//! [`ForecastService`] answers "forecast for this city" by consulting the
//! cache first and falling back to geocoding then forecast lookups upstream.
//! The cache is an accelerator only: failures on either the read or the
//! write path are logged and the request proceeds as if no cache existed.
//! Upstream failures have no fallback and surface to the caller unchanged.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::{derive_key, CacheStore};
use crate::cli::CacheSettings;
use crate::data::{CoordinateResolver, Forecast, ForecastError, ForecastFetcher};

/// Coordinates the cache and the two upstream lookups
#[derive(Clone)]
pub struct ForecastService {
    resolver: Arc<dyn CoordinateResolver>,
    fetcher: Arc<dyn ForecastFetcher>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ForecastService {
    /// Creates a service from its collaborators and the cache settings
    pub fn new(
        resolver: Arc<dyn CoordinateResolver>,
        fetcher: Arc<dyn ForecastFetcher>,
        cache: Arc<dyn CacheStore>,
        settings: &CacheSettings,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            cache,
            ttl: settings.ttl,
        }
    }

    /// Returns the hourly forecast for an already-normalized city name
    ///
    /// # Errors
    /// * `ForecastError::CityNotFound` - the geocoder has no match for `city`
    /// * `ForecastError::UpstreamUnavailable` - either upstream call failed
    pub async fn get_forecast_by_city(&self, city: &str) -> Result<Forecast, ForecastError> {
        let key = derive_key(city);

        match self.cache.get(&key).await {
            Ok(Some(forecast)) => {
                info!(city = %city, key = %key, "cache hit");
                return Ok(forecast);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(city = %city, key = %key, error = %e, "cache read failed, fetching from upstream");
            }
        }

        info!(city = %city, key = %key, "cache miss, fetching from upstream");
        let coordinates = self.resolver.resolve(city).await?;
        let forecast = self
            .fetcher
            .fetch_hourly(coordinates.latitude, coordinates.longitude)
            .await?;

        if let Err(e) = self.cache.set(&key, &forecast, self.ttl).await {
            warn!(city = %city, key = %key, error = %e, "cache write failed, serving uncached result");
        }

        Ok(forecast)
    }
}
