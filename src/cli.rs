//! Command-line interface and configuration for the city weather service
//!
//! This module parses CLI arguments (with environment-variable fallbacks)
//! using clap and turns them into the [`ServiceConfig`] that is built once at
//! startup and passed by reference into every component constructor.

use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::data::geocoding::GEOCODING_BASE_URL;
use crate::data::weather::OPEN_METEO_BASE_URL;

/// Default cache time-to-live in seconds (15 minutes)
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 900;

/// Default upstream request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Default bound on a single cache operation in milliseconds
pub const DEFAULT_CACHE_TIMEOUT_MILLIS: u64 = 500;

/// Error types for configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration setting was zero where a positive value is required
    #[error("Invalid setting: {0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// An upstream base URL could not be parsed
    #[error("Invalid URL for {name}: '{value}'")]
    InvalidUrl { name: &'static str, value: String },
}

/// Which cache backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CacheBackend {
    /// Networked Redis server
    #[default]
    Redis,
    /// JSON files in a cache directory
    File,
    /// In-process memory, lost on restart
    Memory,
    /// Disable caching
    None,
}

/// City weather service - hourly temperature forecasts as HTML or PNG
#[derive(Parser, Debug)]
#[command(name = "cityweather")]
#[command(about = "Serve hourly temperature forecasts for a city as an HTML page or PNG chart")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// How long a cached forecast stays fresh, in seconds
    #[arg(long, env = "CACHE_TTL_SECONDS", default_value_t = DEFAULT_CACHE_TTL_SECONDS)]
    pub cache_ttl_seconds: u64,

    /// Cache backend
    #[arg(long, env = "CACHE_BACKEND", value_enum, default_value_t = CacheBackend::Redis)]
    pub cache_backend: CacheBackend,

    /// Redis connection URL (redis backend)
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    /// Cache directory (file backend); defaults to the platform cache dir
    #[arg(long, env = "CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Upper bound on a single cache read or write, in milliseconds
    #[arg(long, env = "CACHE_TIMEOUT_MILLIS", default_value_t = DEFAULT_CACHE_TIMEOUT_MILLIS)]
    pub cache_timeout_millis: u64,

    /// Geocoding API base URL
    #[arg(long, env = "GEOCODING_URL", default_value = GEOCODING_BASE_URL)]
    pub geocoding_url: String,

    /// Forecast API base URL
    #[arg(long, env = "FORECAST_URL", default_value = OPEN_METEO_BASE_URL)]
    pub forecast_url: String,

    /// Timeout for each upstream API request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECONDS)]
    pub request_timeout_seconds: u64,
}

/// Cache settings consumed by the cache backends and the forecast service
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    /// Time-to-live applied to every entry at creation
    pub ttl: Duration,
    pub redis_url: String,
    pub dir: Option<PathBuf>,
    /// Upper bound on a single cache operation
    pub operation_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            redis_url: "redis://localhost:6379".to_string(),
            dir: None,
            operation_timeout: Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MILLIS),
        }
    }
}

/// Upstream API endpoints
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub request_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_BASE_URL.to_string(),
            forecast_url: OPEN_METEO_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }
}

/// Process-wide configuration, built once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to, e.g. `0.0.0.0:3000`
    pub listen_addr: String,
    pub cache: CacheSettings,
    pub upstream: UpstreamSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            cache: CacheSettings::default(),
            upstream: UpstreamSettings::default(),
        }
    }
}

/// Checks that `value` parses as an absolute URL
fn validate_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    url::Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    })?;
    Ok(value.to_string())
}

/// Joins host and port into a bindable address, bracketing IPv6 literals
fn listen_addr(host: &str, port: u16) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{}]:{}", host, port),
        Err(_) => format!("{}:{}", host, port),
    }
}

impl ServiceConfig {
    /// Creates a ServiceConfig from parsed CLI arguments
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` with validated settings
    /// * `Err(ConfigError)` if a setting is out of range or malformed
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.cache_ttl_seconds == 0 {
            return Err(ConfigError::ZeroDuration("cache-ttl-seconds"));
        }
        if cli.request_timeout_seconds == 0 {
            return Err(ConfigError::ZeroDuration("request-timeout-seconds"));
        }
        if cli.cache_timeout_millis == 0 {
            return Err(ConfigError::ZeroDuration("cache-timeout-millis"));
        }

        Ok(ServiceConfig {
            listen_addr: listen_addr(&cli.host, cli.port),
            cache: CacheSettings {
                backend: cli.cache_backend,
                ttl: Duration::from_secs(cli.cache_ttl_seconds),
                redis_url: cli.redis_url.clone(),
                dir: cli.cache_dir.clone(),
                operation_timeout: Duration::from_millis(cli.cache_timeout_millis),
            },
            upstream: UpstreamSettings {
                geocoding_url: validate_url("geocoding-url", &cli.geocoding_url)?,
                forecast_url: validate_url("forecast-url", &cli.forecast_url)?,
                request_timeout: Duration::from_secs(cli.request_timeout_seconds),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["cityweather"]);
        assert_eq!(cli.cache_backend, CacheBackend::Redis);
        assert_eq!(cli.cache_ttl_seconds, 900);
        assert!(cli.cache_dir.is_none());
    }

    #[test]
    fn test_cli_parse_backend_and_port() {
        let cli = Cli::parse_from(["cityweather", "--cache-backend", "memory", "--port", "8080"]);
        assert_eq!(cli.cache_backend, CacheBackend::Memory);
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn test_cli_parse_invalid_backend() {
        let result = Cli::try_parse_from(["cityweather", "--cache-backend", "memcached"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.cache.ttl, Duration::from_secs(900));
        assert_eq!(config.upstream.geocoding_url, GEOCODING_BASE_URL);
        assert_eq!(config.upstream.forecast_url, OPEN_METEO_BASE_URL);
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_service_config_from_cli() {
        let cli = Cli::parse_from([
            "cityweather",
            "--host",
            "127.0.0.1",
            "--port",
            "4000",
            "--cache-ttl-seconds",
            "60",
            "--cache-backend",
            "file",
            "--cache-dir",
            "/tmp/cityweather",
            "--forecast-url",
            "http://localhost:9000/v1/forecast",
        ]);
        let config = ServiceConfig::from_cli(&cli).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:4000");
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.backend, CacheBackend::File);
        assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/cityweather")));
        assert_eq!(config.upstream.forecast_url, "http://localhost:9000/v1/forecast");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let cli = Cli::parse_from(["cityweather", "--host", "::", "--port", "4000"]);
        let config = ServiceConfig::from_cli(&cli).unwrap();

        assert_eq!(config.listen_addr, "[::]:4000");
        assert!(config.listen_addr.parse::<std::net::SocketAddr>().is_ok());
    }

    #[test]
    fn test_listen_addr_forms() {
        assert_eq!(listen_addr("::1", 3000), "[::1]:3000");
        assert_eq!(listen_addr("[::1]", 3000), "[::1]:3000");
        assert_eq!(listen_addr("0.0.0.0", 3000), "0.0.0.0:3000");
        assert_eq!(listen_addr("localhost", 8080), "localhost:8080");
    }

    #[test]
    fn test_service_config_rejects_zero_ttl() {
        let cli = Cli::parse_from(["cityweather", "--cache-ttl-seconds", "0"]);
        let err = ServiceConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("cache-ttl-seconds"));
    }

    #[test]
    fn test_service_config_rejects_bad_url() {
        let cli = Cli::parse_from(["cityweather", "--geocoding-url", "not a url"]);
        let result = ServiceConfig::from_cli(&cli);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { name: "geocoding-url", .. })));
    }
}
