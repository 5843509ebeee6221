//! No-op cache store for running without a cache

use std::time::Duration;

use async_trait::async_trait;

use super::{CacheError, CacheStore};
use crate::data::Forecast;

/// Always misses and discards writes
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl CacheStore for NullCache {
    async fn get(&self, _key: &str) -> Result<Option<Forecast>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _forecast: &Forecast, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
