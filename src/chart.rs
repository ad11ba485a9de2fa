use std::ops::Range;
use std::path::{Path, PathBuf};
use chrono::{NaiveDateTime, TimeDelta};
use plotters::prelude::*;
use thiserror::Error;
use crate::config::ChartParameters;
use crate::models::PriceInterval;

const CAPTION_FONT_SIZE: u32 = 28;
const LABEL_FONT_SIZE: u32 = 14;
const MARKER_SIZE: u32 = 3;

/// Returns the path of the chart image for a country
///
/// # Arguments
///
/// * 'output_dir' - directory for output files
/// * 'country' - country code
pub fn chart_path(output_dir: &Path, country: &str) -> PathBuf {
    output_dir.join(format!("hourly_electricity_rates_{}.png", country))
}

/// Draws a line chart of hourly rates and saves it as a PNG image.
/// The x axis shows time of day with one tick per hour, an empty list gives an empty chart.
///
/// # Arguments
///
/// * 'records' - rates to plot, ordered by time
/// * 'country' - country code used in the caption
/// * 'path' - path of the image to write
/// * 'settings' - image dimensions
pub fn plot_hourly_rates(records: &[PriceInterval], country: &str, path: &Path, settings: &ChartParameters) -> Result<(), ChartError> {
    let origin = records.first().map(|r| r.from);
    let (x_range, y_range) = chart_bounds(records);
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| origin.map(|o| (hours_since(o, r.from), r.value)))
        .collect();

    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawError(format!("failed to fill canvas: {}", e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Hourly Electricity Rates for {}", country), ("sans-serif", CAPTION_FONT_SIZE).into_font())
        .margin(15)
        .x_label_area_size(80)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(|e| ChartError::DrawError(format!("failed to build chart: {}", e)))?;

    let hour_label = |x: &f64| match origin {
        Some(o) => time_of_day(o, *x),
        None => String::new(),
    };
    let x_label_style = ("sans-serif", LABEL_FONT_SIZE)
        .into_font()
        .transform(FontTransform::Rotate90);

    chart
        .configure_mesh()
        .x_labels(hour_ticks(&x_range))
        .x_label_formatter(&hour_label)
        .x_label_style(x_label_style)
        .x_desc("Time (Hourly Intervals)")
        .y_desc("Price (EUR per kWh)")
        .draw()
        .map_err(|e| ChartError::DrawError(format!("failed to draw mesh: {}", e)))?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(|e| ChartError::DrawError(format!("failed to draw line: {}", e)))?;

    chart
        .draw_series(points.iter().map(|p| Circle::new(*p, MARKER_SIZE, BLUE.filled())))
        .map_err(|e| ChartError::DrawError(format!("failed to draw markers: {}", e)))?;

    root.present()
        .map_err(|e| ChartError::SaveError(format!("failed to write {}: {}", path.display(), e)))?;

    Ok(())
}

/// Returns the x range, in hours from the first record, and the y range with some padding.
/// Ranges are never empty, so single or missing points still give a drawable chart.
///
/// # Arguments
///
/// * 'records' - rates to plot, ordered by time
fn chart_bounds(records: &[PriceInterval]) -> (Range<f64>, Range<f64>) {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return (0.0..1.0, 0.0..1.0),
    };

    let x_max = hours_since(first.from, last.from).max(1.0);

    let min_value = records.iter().map(|r| r.value).fold(f64::INFINITY, f64::min);
    let max_value = records.iter().map(|r| r.value).fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max_value - min_value) * 0.1).max(0.01);

    (0.0..x_max, (min_value - padding)..(max_value + padding))
}

/// Number of x labels needed for one label per hour
///
/// # Arguments
///
/// * 'x_range' - x range in hours
fn hour_ticks(x_range: &Range<f64>) -> usize {
    (x_range.end - x_range.start).ceil() as usize + 1
}

fn hours_since(origin: NaiveDateTime, time: NaiveDateTime) -> f64 {
    (time - origin).num_minutes() as f64 / 60.0
}

/// Formats an x value, given in hours from origin, as 'HH:MM'
///
/// # Arguments
///
/// * 'origin' - time at x = 0
/// * 'hours' - hours from origin
fn time_of_day(origin: NaiveDateTime, hours: f64) -> String {
    let time = origin + TimeDelta::minutes((hours * 60.0).round() as i64);
    time.format("%H:%M").to_string()
}

/// Error depicting errors that occur while drawing charts
///
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("DrawError: {0}")]
    DrawError(String),
    #[error("SaveError: {0}")]
    SaveError(String),
}
