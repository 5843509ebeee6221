//! Cache module for short-circuiting upstream forecast calls
//!
//! This module defines the [`CacheStore`] contract consumed by the forecast
//! service along with its backends:
//! - [`RedisCache`] - networked store, the production default
//! - [`FileCache`] - JSON files with expiry timestamps in the XDG cache directory
//! - [`MemoryCache`] - in-process map with per-entry deadlines
//! - [`NullCache`] - never hits, discards writes
//!
//! Every backend enforces expiry itself: an expired entry is reported as absent.

mod file;
mod key;
mod memory;
mod null;
mod redis_cache;

pub use file::FileCache;
pub use key::{derive_key, KEY_NAMESPACE};
pub use memory::MemoryCache;
pub use null::NullCache;
pub use redis_cache::RedisCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::cli::{CacheBackend, CacheSettings};
use crate::data::Forecast;

/// Errors raised by a cache backend
///
/// Every variant means the cache is unavailable for this operation; callers
/// treat them uniformly.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached or refused the operation
    #[error("Cache service is unavailable: {0}")]
    Unavailable(String),

    /// The stored payload could not be encoded or decoded
    #[error("Cache payload is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value store holding serialized forecasts with per-entry expiry
///
/// Implementations must be safe to share across concurrent requests. Writes
/// to an existing key overwrite it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the forecast stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(forecast))` on a fresh hit
    /// * `Ok(None)` when the key is absent or expired
    /// * `Err(CacheError)` when the store is unreachable or the payload is malformed
    async fn get(&self, key: &str) -> Result<Option<Forecast>, CacheError>;

    /// Stores `forecast` under `key`, expiring after `ttl`
    async fn set(&self, key: &str, forecast: &Forecast, ttl: Duration) -> Result<(), CacheError>;
}

/// Opens the cache backend selected by `settings`
///
/// Connecting to Redis is deferred to the first operation so a cache that is
/// down at startup does not keep the service from starting.
///
/// # Errors
/// Returns `CacheError::Unavailable` if the backend cannot be configured
/// (e.g. an unparseable Redis URL or no resolvable cache directory).
pub fn open_store(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>, CacheError> {
    let store: Arc<dyn CacheStore> = match settings.backend {
        CacheBackend::Redis => Arc::new(RedisCache::open(
            &settings.redis_url,
            settings.operation_timeout,
        )?),
        CacheBackend::File => {
            let cache = match &settings.dir {
                Some(dir) => FileCache::with_dir(dir.clone()),
                None => FileCache::new().ok_or_else(|| {
                    CacheError::Unavailable("could not determine a cache directory".to_string())
                })?,
            };
            Arc::new(cache)
        }
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::None => Arc::new(NullCache),
    };
    Ok(store)
}
