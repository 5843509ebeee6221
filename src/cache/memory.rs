//! In-process cache store

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheError, CacheStore};
use crate::data::Forecast;

/// Forecasts held in memory with a per-entry deadline
///
/// Entries are stored serialized, like the networked backends, so a value
/// read back is always an independent copy. Every write sweeps expired
/// entries, so the map never holds more than the live keys plus whatever
/// expired since the last write.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Forecast>, CacheError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((payload, deadline)) if Instant::now() < *deadline => {
                Ok(Some(serde_json::from_str(payload)?))
            }
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, forecast: &Forecast, ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(forecast)?;
        let now = Instant::now();
        let deadline = now
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("ttl out of range: {:?}", ttl)))?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(key.to_string(), (payload, deadline));
        Ok(())
    }
}
