//! Open-Meteo weather API client
//!
//! This module fetches hourly temperature forecasts from the Open-Meteo API
//! and validates them into our Forecast structure.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, error};

use super::{Forecast, ForecastError, ForecastFetcher};

/// Default base URL for the Open-Meteo forecast API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Client for fetching weather data from Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    pub fn new() -> Self {
        Self::with_client(Client::new(), OPEN_METEO_BASE_URL)
    }

    /// Create a new WeatherClient with a custom HTTP client and base URL
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the forecast request for the given coordinates
    ///
    /// Parameters are appended to any query already on the base URL.
    fn forecast_request(&self, lat: f64, lon: f64) -> RequestBuilder {
        self.client
            .get(&self.base_url)
            .query(&[("latitude", lat), ("longitude", lon)])
            .query(&[("hourly", "temperature_2m")])
    }

    /// Validate a decoded response before handing it out
    fn validate(forecast: Forecast) -> Result<Forecast, ForecastError> {
        if !forecast.hourly.is_aligned() {
            return Err(ForecastError::UpstreamUnavailable(
                "hourly arrays have inconsistent lengths".to_string(),
            ));
        }
        Ok(forecast)
    }
}

#[async_trait]
impl ForecastFetcher for WeatherClient {
    /// Fetch hourly temperatures for the given coordinates
    ///
    /// # Arguments
    /// * `lat` - Latitude coordinate
    /// * `lon` - Longitude coordinate
    ///
    /// # Returns
    /// * `Ok(Forecast)` - Hourly series for the location
    /// * `Err(ForecastError::UpstreamUnavailable)` - If the request or parsing fails
    async fn fetch_hourly(&self, lat: f64, lon: f64) -> Result<Forecast, ForecastError> {
        let response = self.forecast_request(lat, lon).send().await.map_err(|e| {
            error!(latitude = lat, longitude = lon, error = %e, "weather request failed");
            ForecastError::UpstreamUnavailable("Failed to fetch weather data".to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(latitude = lat, longitude = lon, status = %status, "weather API returned an error status");
            return Err(ForecastError::UpstreamUnavailable(format!(
                "API returned status {}",
                status
            )));
        }

        let text = response.text().await.map_err(|e| {
            error!(error = %e, "weather response body could not be read");
            ForecastError::UpstreamUnavailable("Failed to read weather data".to_string())
        })?;
        let forecast: Forecast = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "weather response could not be parsed");
            ForecastError::UpstreamUnavailable("Failed to parse weather data".to_string())
        })?;

        let forecast = Self::validate(forecast)?;
        debug!(latitude = lat, longitude = lon, hours = forecast.hourly.len(), "fetched forecast");
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sample valid Open-Meteo API response
    const VALID_RESPONSE: &str = r#"{
        "latitude": 48.86,
        "longitude": 2.3399997,
        "generationtime_ms": 0.04,
        "utc_offset_seconds": 0,
        "timezone": "GMT",
        "timezone_abbreviation": "GMT",
        "elevation": 43.0,
        "hourly_units": {
            "time": "iso8601",
            "temperature_2m": "°C"
        },
        "hourly": {
            "time": ["2024-07-15T00:00", "2024-07-15T01:00", "2024-07-15T02:00"],
            "temperature_2m": [19.4, 18.7, 18.1]
        }
    }"#;

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::with_client(Client::new(), format!("{}/v1/forecast", server.uri()))
    }

    #[test]
    fn test_forecast_request_url() {
        let request = WeatherClient::new().forecast_request(48.85, 2.35).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.open-meteo.com/v1/forecast?latitude=48.85&longitude=2.35&hourly=temperature_2m"
        );
    }

    #[test]
    fn test_forecast_request_keeps_base_query() {
        let client = WeatherClient::with_client(
            Client::new(),
            "https://customer-api.open-meteo.com/v1/forecast?apikey=k",
        );
        let request = client.forecast_request(48.85, 2.35).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://customer-api.open-meteo.com/v1/forecast?apikey=k&latitude=48.85&longitude=2.35&hourly=temperature_2m"
        );
    }

    #[test]
    fn test_validate_rejects_misaligned_arrays() {
        let mut forecast: Forecast = serde_json::from_str(VALID_RESPONSE).unwrap();
        forecast.hourly.time.push("2024-07-15T03:00".to_string());

        assert!(matches!(
            WeatherClient::validate(forecast),
            Err(ForecastError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_hourly_parses_valid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "48.85"))
            .and(query_param("longitude", "2.35"))
            .and(query_param("hourly", "temperature_2m"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forecast = client_for(&mock_server).fetch_hourly(48.85, 2.35).await.unwrap();

        assert_eq!(forecast.hourly.len(), 3);
        assert_eq!(forecast.hourly.time[0], "2024-07-15T00:00");
        assert!((forecast.hourly.temperature_2m[2] - 18.1).abs() < 0.01);
        assert!((forecast.latitude - 48.86).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_fetch_hourly_with_query_in_base_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("apikey", "k"))
            .and(query_param("latitude", "48.85"))
            .and(query_param("longitude", "2.35"))
            .and(query_param("hourly", "temperature_2m"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherClient::with_client(
            Client::new(),
            format!("{}/v1/forecast?apikey=k", mock_server.uri()),
        );
        let forecast = client.fetch_hourly(48.85, 2.35).await.unwrap();

        assert_eq!(forecast.hourly.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_hourly_server_error_is_upstream_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_hourly(1.0, 2.0).await;

        match result {
            Err(ForecastError::UpstreamUnavailable(msg)) => assert!(msg.contains("502")),
            other => panic!("Expected UpstreamUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_hourly_malformed_json_is_upstream_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"latitude": 1.0, "longitude": 2.0})),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_hourly(1.0, 2.0).await;

        assert!(matches!(result, Err(ForecastError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_hourly_misaligned_arrays_is_upstream_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 1.0,
                "longitude": 2.0,
                "hourly": {"time": ["2024-07-15T00:00", "2024-07-15T01:00"], "temperature_2m": [3.0]}
            })))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_hourly(1.0, 2.0).await;

        assert!(matches!(result, Err(ForecastError::UpstreamUnavailable(_))));
    }
}
