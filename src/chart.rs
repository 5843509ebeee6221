//! PNG temperature chart rendering
//!
//! Draws an hourly temperature line chart with `HH:MM` hour labels, a
//! temperature scale and a legend, then encodes it as PNG. Text uses a
//! bundled DejaVu Sans, so rendering does not depend on system fonts.

use std::fmt::Display;
use std::io::Cursor;
use std::sync::OnceLock;

use chrono::{NaiveDateTime, Timelike};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use thiserror::Error;

/// Chart width in pixels
pub const WIDTH: u32 = 800;
/// Chart height in pixels
pub const HEIGHT: u32 = 400;

/// Legend entry for the temperature line
pub const LEGEND: &str = "Temperature (°C) for the next 24h";

/// Approximate number of temperature levels on the y axis
const TEMPERATURE_LEVELS: usize = 5;
/// Approximate number of hour labels on the x axis
const HOUR_LABELS: usize = 8;
/// Vertical gridlines at hours divisible by this are drawn darker
const MAJOR_HOUR_STEP: u32 = 6;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf"));

const GRID: RGBColor = RGBColor(235, 235, 235);
const GRID_MAJOR: RGBColor = RGBColor(200, 200, 200);
const LINE: RGBColor = RGBColor(75, 192, 192);

/// Errors that can occur while rendering a chart
#[derive(Debug, Error)]
pub enum ChartError {
    /// Nothing to plot
    #[error("no data points to plot")]
    Empty,

    /// The bundled font could not be loaded
    #[error("failed to load chart font: {0}")]
    Font(String),

    /// Drawing onto the bitmap failed
    #[error("failed to draw chart: {0}")]
    Draw(String),

    /// PNG encoding failed
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_error(e: impl Display) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Registers the bundled font with plotters once per process
fn ensure_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).map_err(|_| "invalid font data".to_string())
        })
        .clone()
        .map_err(ChartError::Font)
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M").ok()
}

/// Extracts the hour of day from an upstream timestamp like `2024-07-15T06:00`
fn hour_of(timestamp: &str) -> Option<u32> {
    parse_timestamp(timestamp).map(|dt| dt.hour())
}

/// Formats a timestamp as `HH:MM`, falling back to the raw text
fn hour_label(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => timestamp.to_string(),
    }
}

/// Temperature range shown on the y axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn from_values(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // A flat series still needs a non-zero range
        let pad = ((max - min) * 0.1).max(1.0);
        Self {
            min: min - pad,
            max: max + pad,
        }
    }
}

/// Renders `(timestamp, temperature)` points as a PNG line chart
///
/// # Errors
/// * `ChartError::Empty` - no points were given
/// * `ChartError::Font` / `ChartError::Draw` - the chart could not be drawn
/// * `ChartError::Encode` - PNG encoding failed
pub fn render_temperature_chart(points: &[(&str, f64)]) -> Result<Vec<u8>, ChartError> {
    if points.is_empty() {
        return Err(ChartError::Empty);
    }
    ensure_font()?;

    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let scale = Scale::from_values(&values);
    let last_index = (points.len() - 1).max(1);

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0..last_index, scale.min..scale.max)
            .map_err(draw_error)?;

        let x_label = |i: &usize| points.get(*i).map(|(t, _)| hour_label(t)).unwrap_or_default();
        let y_label = |v: &f64| format!("{:.0}°", v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(HOUR_LABELS)
            .y_labels(TEMPERATURE_LEVELS)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .light_line_style(&GRID)
            .bold_line_style(&GRID)
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(points.iter().enumerate().map(|(i, (timestamp, _))| {
                let color = match hour_of(timestamp) {
                    Some(hour) if hour % MAJOR_HOUR_STEP == 0 => GRID_MAJOR,
                    _ => GRID,
                };
                PathElement::new(vec![(i, scale.min), (i, scale.max)], color.stroke_width(1))
            }))
            .map_err(draw_error)?;

        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i, *v)),
                LINE.stroke_width(2),
            ))
            .map_err(draw_error)?
            .label(LEGEND)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE.stroke_width(2)));

        chart
            .draw_series(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Circle::new((i, *v), 3, LINE.filled())),
            )
            .map_err(draw_error)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }

    let img = RgbImage::from_raw(WIDTH, HEIGHT, buffer)
        .ok_or_else(|| ChartError::Draw("bitmap size mismatch".to_string()))?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
