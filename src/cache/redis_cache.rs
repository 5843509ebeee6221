//! Redis-backed cache store

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisResult};
use tokio::sync::OnceCell;
use tracing::debug;

use super::{CacheError, CacheStore};
use crate::data::Forecast;

/// Forecasts stored as JSON strings under `SET key value EX ttl`
///
/// The connection is opened on first use and shared afterwards. Every
/// command is bounded by `op_timeout`, so an unreachable server surfaces as
/// [`CacheError::Unavailable`] quickly instead of stalling the request.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    op_timeout: Duration,
}

impl RedisCache {
    /// Creates a cache for the given `redis://` URL without connecting
    ///
    /// # Errors
    /// Returns `CacheError::Unavailable` if the URL cannot be parsed.
    pub fn open(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {}", e)))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            op_timeout,
        })
    }

    /// Runs a Redis future under the operation timeout
    async fn bounded<T>(&self, fut: impl Future<Output = RedisResult<T>>) -> Result<T, CacheError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Unavailable(format!(
                "redis did not answer within {:?}",
                self.op_timeout
            ))),
        }
    }

    /// Returns the shared connection, connecting if this is the first use
    ///
    /// A failed attempt leaves the cell empty so the next call retries.
    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                debug!("connecting to redis");
                self.bounded(ConnectionManager::new(self.client.clone())).await
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Forecast>, CacheError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = self
            .bounded(::redis::cmd("GET").arg(key).query_async(&mut conn))
            .await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, forecast: &Forecast, ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(forecast)?;
        // EX rejects zero
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        let _: () = self
            .bounded(
                ::redis::cmd("SET")
                    .arg(key)
                    .arg(payload)
                    .arg("EX")
                    .arg(seconds)
                    .query_async(&mut conn),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HourlySeries;
    use std::time::Instant;

    fn unreachable_cache() -> RedisCache {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        RedisCache::open(&format!("redis://{}", addr), Duration::from_millis(300)).unwrap()
    }

    fn forecast() -> Forecast {
        Forecast {
            latitude: 0.0,
            longitude: 0.0,
            hourly: HourlySeries {
                time: vec![],
                temperature_2m: vec![],
            },
        }
    }

    #[test]
    fn test_open_accepts_valid_url() {
        assert!(RedisCache::open("redis://localhost:6379", Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_open_rejects_invalid_url() {
        assert!(matches!(
            RedisCache::open("http://", Duration::from_secs(1)),
            Err(CacheError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_get_against_unreachable_server_is_unavailable() {
        let cache = unreachable_cache();
        let started = Instant::now();

        let result = cache.get("weather:paris").await;

        assert!(matches!(result, Err(CacheError::Unavailable(_))));
        assert!(started.elapsed() < Duration::from_secs(5), "should fail fast");
    }

    #[tokio::test]
    async fn test_set_against_unreachable_server_is_unavailable() {
        let cache = unreachable_cache();

        let result = cache.set("weather:paris", &forecast(), Duration::from_secs(900)).await;

        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
