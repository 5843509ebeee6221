//! Request routing and HTTP mapping for the weather endpoints

use tracing::{error, warn};

use crate::chart::render_temperature_chart;
use crate::data::ForecastError;
use crate::forecast::ForecastService;
use crate::http::{Method, Request, Response, StatusCode};

/// Number of hourly points plotted on the chart
pub const CHART_HOURS: usize = 24;

const UNAVAILABLE_MESSAGE: &str = "A required external service is currently unavailable.";

/// Routes requests to the page and chart handlers
#[derive(Clone)]
pub struct WeatherController {
    service: ForecastService,
}

impl WeatherController {
    pub fn new(service: ForecastService) -> Self {
        Self { service }
    }

    /// Dispatches a request by method and path
    pub async fn route(&self, request: Request) -> Response {
        match (request.method(), request.path()) {
            (Method::Get, "/weather") => self.weather_page(&request),
            (Method::Get, "/weather/graph") => self.weather_graph(&request).await,
            _ => Response::json_message(StatusCode::NotFound, "Not Found"),
        }
    }

    fn weather_page(&self, request: &Request) -> Response {
        match request.query_param("city").and_then(normalize_city) {
            Some(city) => Response::html(StatusCode::Ok, render_page(&city)),
            None => Response::html(
                StatusCode::BadRequest,
                "<h1>400 Bad Request: \"city\" query parameter is required.</h1>",
            ),
        }
    }

    async fn weather_graph(&self, request: &Request) -> Response {
        let Some(city) = request.query_param("city").and_then(normalize_city) else {
            return Response::json_message(StatusCode::BadRequest, "City parameter is required");
        };

        let forecast = match self.service.get_forecast_by_city(&city).await {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!(city = %city, error = %e, "forecast lookup failed");
                return match e {
                    ForecastError::CityNotFound(_) => {
                        Response::json_message(StatusCode::NotFound, &e.to_string())
                    }
                    ForecastError::UpstreamUnavailable(_) => {
                        Response::json_message(StatusCode::ServiceUnavailable, UNAVAILABLE_MESSAGE)
                    }
                };
            }
        };

        let points: Vec<(&str, f64)> = forecast.hourly.points().take(CHART_HOURS).collect();
        match render_temperature_chart(&points) {
            Ok(png) => Response::new(StatusCode::Ok)
                .header("Content-Type", "image/png")
                .body_bytes(png),
            Err(e) => {
                error!(city = %city, error = %e, "chart rendering failed");
                Response::json_message(StatusCode::InternalServerError, "Internal Server Error")
            }
        }
    }
}

/// Trims and lower-cases a city name; blank names are rejected
pub fn normalize_city(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn capitalize(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn render_page(city: &str) -> String {
    let title = escape_html(&capitalize(city));
    let encoded: String = url::form_urlencoded::byte_serialize(city.as_bytes()).collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Weather in {title}</title>
    <style> body {{ font-family: sans-serif; text-align: center; margin-top: 50px; }} </style>
</head>
<body>
    <h1>Weather forecast for {title}</h1>
    <img src="/weather/graph?city={encoded}" alt="Temperature chart for {alt}">
</body>
</html>
"#,
        alt = escape_html(city),
    )
}
