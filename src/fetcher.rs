use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use log::{error, info};
use thiserror::Error;
use crate::manager_entsoe::PriceSource;
use crate::manager_entsoe::errors::EntsoeError;
use crate::models::PriceInterval;

/// Length of one interval in minutes
const INTERVAL_MINUTES: u32 = 60;

/// Result of fetching and saving rates for one country
#[derive(Debug)]
pub enum FetchOutcome {
    /// Rates were fetched and saved
    Saved { path: PathBuf, records: usize },
    /// The provider had no prices for the window, an empty list was saved
    Empty { path: PathBuf },
    /// Nothing was saved
    Failed(RatesError),
}

/// Returns the path of the rates file for a country
///
/// # Arguments
///
/// * 'output_dir' - directory for output files
/// * 'country' - country code
pub fn rates_path(output_dir: &Path, country: &str) -> PathBuf {
    output_dir.join(format!("hourly_electricity_rates_{}.json", country))
}

/// Fetches day ahead prices for 24 hours from start, converts them to EUR/kWh and saves
/// them as a JSON array of price intervals.
///
/// # Arguments
///
/// * 'source' - provider of day ahead prices
/// * 'country' - country code
/// * 'start' - start of the 24 hour window
/// * 'output_dir' - directory to write the rates file into
pub fn fetch_hourly_rates<Tz: TimeZone>(source: &dyn PriceSource, country: &str, start: &DateTime<Tz>, output_dir: &Path) -> FetchOutcome {
    match fetch_and_save(source, country, start, output_dir) {
        Ok((path, records)) => {
            info!("Successfully fetched and saved hourly electricity rates for {}.", country);
            if records == 0 {
                FetchOutcome::Empty { path }
            } else {
                FetchOutcome::Saved { path, records }
            }
        },
        Err(e) => {
            error!("Error fetching hourly electricity rates for {}: {}", country, e);
            FetchOutcome::Failed(e)
        }
    }
}

fn fetch_and_save<Tz: TimeZone>(source: &dyn PriceSource, country: &str, start: &DateTime<Tz>, output_dir: &Path) -> Result<(PathBuf, usize), RatesError> {
    let start_utc = start.with_timezone(&Utc);
    let end_utc = start_utc + TimeDelta::days(1);

    let prices = source.day_ahead_prices(country, start_utc, end_utc)?;
    let records = to_interval_records(start, &prices);

    let path = rates_path(output_dir, country);
    save_rates(&path, &records)?;

    Ok((path, records.len()))
}

/// Transforms prices in EUR/MWh into hourly intervals in EUR/kWh.
/// The n:th price is taken to start n hours after start, shown as wall time in start's timezone.
///
/// # Arguments
///
/// * 'start' - start of the first interval
/// * 'prices' - prices in EUR/MWh, one per hour
pub fn to_interval_records<Tz: TimeZone>(start: &DateTime<Tz>, prices: &[f64]) -> Vec<PriceInterval> {
    prices
        .iter()
        .enumerate()
        .map(|(i, price)| PriceInterval {
            from: (start.clone() + TimeDelta::hours(i as i64)).naive_local(),
            duration: INTERVAL_MINUTES,
            value: round_to_two_decimals(price / 1000.0),
        })
        .collect()
}

/// Saves rates to file, any existing file is replaced.
/// Rates go to a temporary file next to the target which is then renamed over it,
/// so a failed save leaves any previous file untouched.
///
/// # Arguments
///
/// * 'path' - path of the rates file
/// * 'records' - the rates to save
pub fn save_rates(path: &Path, records: &[PriceInterval]) -> Result<(), RatesError> {
    let json = serde_json::to_string(records)
        .map_err(|e| RatesError::SaveError(format!("error serializing rates: {}", e)))?;

    let tmp_path = temporary_path(path);

    let result = fs::write(&tmp_path, json)
        .and_then(|_| fs::rename(&tmp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(RatesError::SaveError(format!("error writing rates to {}: {}", path.display(), e)));
    }

    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Loads rates previously saved by `save_rates`
///
/// # Arguments
///
/// * 'path' - path of the rates file
pub fn load_rates(path: &Path) -> Result<Vec<PriceInterval>, RatesError> {
    let json = fs::read_to_string(path)
        .map_err(|e| RatesError::LoadError(format!("error reading {}: {}", path.display(), e)))?;

    serde_json::from_str(&json)
        .map_err(|e| RatesError::LoadError(format!("error parsing {}: {}", path.display(), e)))
}

/// Rounds values to two decimals from their exact binary value, with ties to even
///
/// # Arguments
///
/// * 'price' - the price to round to two decimals
fn round_to_two_decimals(price: f64) -> f64 {
    format!("{:.2}", price).parse::<f64>().unwrap_or(price)
}

/// Error depicting errors that occur while fetching, saving or loading rates
///
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("ProviderError: {0}")]
    ProviderError(#[from] EntsoeError),
    #[error("SaveError: {0}")]
    SaveError(String),
    #[error("LoadError: {0}")]
    LoadError(String),
}
