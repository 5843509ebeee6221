//! File-backed cache store
//!
//! Persists forecasts as JSON files with expiry timestamps, one file per key.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::{CacheError, CacheStore};
use crate::data::Forecast;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Reads and writes cached forecasts to disk
///
/// Files live in an XDG-compliant cache directory (`~/.cache/cityweather/` on
/// Linux) unless a directory is given explicitly. Entries past their expiry
/// read as absent.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileCache {
    /// Creates a new FileCache using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "cityweather")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new FileCache with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Keys are percent-encoded, so distinct keys always map to distinct
    /// file names and no separator survives into the path.
    fn cache_path(&self, key: &str) -> PathBuf {
        let file_name: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        self.cache_dir.join(format!("{}.json", file_name))
    }
}

fn unavailable(e: std::io::Error) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Forecast>, CacheError> {
        let content = match fs::read_to_string(self.cache_path(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };
        let entry: CacheEntry<Forecast> = serde_json::from_str(&content)?;

        if Utc::now() >= entry.expires_at {
            return Ok(None);
        }
        Ok(Some(entry.data))
    }

    async fn set(&self, key: &str, forecast: &Forecast, ttl: Duration) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).await.map_err(unavailable)?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Unavailable(format!("invalid ttl: {}", e)))?;
        let now = Utc::now();
        let entry = CacheEntry {
            data: forecast,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.cache_path(key), json).await.map_err(unavailable)
    }
}
