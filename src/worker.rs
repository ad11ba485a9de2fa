use std::path::Path;
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use log::{error, info};
use thiserror::Error;
use crate::chart::{chart_path, plot_hourly_rates, ChartError};
use crate::config::{ChartParameters, Config, LoadConfigurationError};
use crate::fetcher::{fetch_hourly_rates, load_rates, FetchOutcome, RatesError};
use crate::initialization::Mgr;

/// Fetches, saves and plots rates for every configured country, one at a time.
/// A failing country doesn't stop the others, but fails the run. Each failure is logged once.
///
/// # Arguments
///
/// * 'config' - configuration
/// * 'mgr' - struct with configured managers
pub fn run(config: &Config, mgr: &Mgr) -> Result<(), WorkerError> {
    let tz = config.market.market_timezone()?;
    let start = day_start(Utc::now(), tz, config.market.day_offset)?;
    let output_dir = Path::new(&config.files.output_dir);

    info!("Fetching day ahead prices from {} for {:?}", start, config.market.countries);

    let mut failed: Vec<String> = Vec::new();
    for country in config.market.countries.iter() {
        match process_country(mgr, country, &start, output_dir, &config.chart) {
            Ok(_) => {},
            // The fetcher has already logged why
            Err(WorkerError::RatesError(RatesError::ProviderError(_))) |
            Err(WorkerError::RatesError(RatesError::SaveError(_))) => failed.push(country.clone()),
            Err(e) => {
                error!("Processing {} failed: {}", country, e);
                failed.push(country.clone());
            }
        }
    }

    if !failed.is_empty() {
        return Err(WorkerError::CountriesError(failed.join(", ")));
    }

    Ok(())
}

/// Fetches rates for one country and, if anything was saved, reads them back and plots them
///
/// # Arguments
///
/// * 'mgr' - struct with configured managers
/// * 'country' - country code
/// * 'start' - start of the 24 hour window
/// * 'output_dir' - directory for rates and chart files
/// * 'chart' - chart settings
fn process_country(mgr: &Mgr, country: &str, start: &DateTime<Tz>, output_dir: &Path, chart: &ChartParameters) -> Result<(), WorkerError> {
    let path = match fetch_hourly_rates(mgr.prices.as_ref(), country, start, output_dir) {
        FetchOutcome::Saved { path, records } => {
            info!("{} hourly rates saved for {}", records, country);
            path
        },
        FetchOutcome::Empty { path } => path,
        FetchOutcome::Failed(e) => return Err(WorkerError::RatesError(e)),
    };

    let records = load_rates(&path)?;
    let image = chart_path(output_dir, country);
    plot_hourly_rates(&records, country, &image, chart)?;

    info!("Chart for {} saved to {}", country, image.display());

    Ok(())
}

/// Returns local midnight of the day at 'day_offset' days from today in the given timezone
///
/// # Arguments
///
/// * 'now' - current time
/// * 'tz' - market timezone
/// * 'day_offset' - days from today, -1 is yesterday
pub fn day_start(now: DateTime<Utc>, tz: Tz, day_offset: i64) -> Result<DateTime<Tz>, WorkerError> {
    let date = now.with_timezone(&tz)
        .date_naive()
        .checked_add_signed(TimeDelta::days(day_offset))
        .ok_or(WorkerError::DayStartError(format!("day offset {} out of range", day_offset)))?;

    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or(WorkerError::DayStartError(format!("no midnight on {} in {}", date, tz)))
}

/// Error depicting errors that occur while running
///
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("DayStartError: {0}")]
    DayStartError(String),
    #[error("RatesError: {0}")]
    RatesError(#[from] RatesError),
    #[error("ChartError: {0}")]
    ChartError(#[from] ChartError),
    #[error("CountriesError: failed countries: {0}")]
    CountriesError(String),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::{env, fs};
    use chrono_tz::Europe::{Brussels, Helsinki};
    use log::Level;
    use crate::config::parse_config;
    use crate::manager_entsoe::PriceSource;
    use crate::manager_entsoe::errors::EntsoeError;
    use crate::test_log;
    use super::*;

    struct NoData;

    impl PriceSource for NoData {
        fn day_ahead_prices(&self, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError> {
            Err(EntsoeError::NoMatchingDataError)
        }
    }

    struct Unauthorized;

    impl PriceSource for Unauthorized {
        fn day_ahead_prices(&self, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError> {
            Err(EntsoeError::UnauthorizedError)
        }
    }

    struct FlatPrices(f64);

    impl PriceSource for FlatPrices {
        fn day_ahead_prices(&self, _: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError> {
            Ok(vec![self.0; (end - start).num_hours() as usize])
        }
    }

    fn output_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("entsoe_rates_worker_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(countries: &str, dir: &Path) -> Config {
        let toml = format!(r#"
            [entsoe]
            api_key = "secret"

            [market]
            countries = [{}]

            [files]
            output_dir = "{}"

            [chart]
            width = 640
            height = 480

            [general]
            log_level = "off"
        "#, countries, dir.display().to_string().replace('\\', "/"));

        parse_config(&toml).unwrap()
    }

    #[test]
    fn yesterday_in_brussels() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        let start = day_start(now, Brussels, -1).unwrap();

        assert_eq!(start, Brussels.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap());
    }

    #[test]
    fn local_date_decides_the_day() {
        // 00:30 on January 2nd in Brussels
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();

        assert_eq!(day_start(now, Brussels, 0).unwrap(), Brussels.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(day_start(now, Brussels, 1).unwrap(), Brussels.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn other_market_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap();

        let start = day_start(now, Helsinki, -1).unwrap();

        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 7, 8, 21, 0, 0).unwrap());
    }

    #[test]
    fn failing_country_fails_run() {
        let dir = output_dir("failing");
        let mgr = Mgr { prices: Box::new(NoData) };

        let result = run(&config(r#""AT", "BE""#, &dir), &mgr);

        match result {
            Err(WorkerError::CountriesError(failed)) => assert_eq!(failed, "AT, BE"),
            _ => panic!("expected CountriesError"),
        }
        assert!(!dir.join("hourly_electricity_rates_AT.json").exists());
        assert!(!dir.join("hourly_electricity_rates_AT.png").exists());
    }

    #[test]
    fn rejected_key_is_logged_once() {
        test_log::capture();
        let dir = output_dir("rejected");
        let mgr = Mgr { prices: Box::new(Unauthorized) };

        let result = run(&config(r#""PL""#, &dir), &mgr);

        assert!(matches!(result, Err(WorkerError::CountriesError(_))));
        let errors: Vec<String> = test_log::messages(Level::Error)
            .into_iter()
            .filter(|m| m.contains("PL"))
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error fetching hourly electricity rates for PL"));
    }

    #[test]
    fn saved_rates_are_plotted() {
        let dir = output_dir("plotted");
        let mgr = Mgr { prices: Box::new(FlatPrices(50.0)) };

        run(&config(r#""AT""#, &dir), &mgr).unwrap();

        let records = load_rates(&dir.join("hourly_electricity_rates_AT.json")).unwrap();
        assert!(records.len() >= 23 && records.len() <= 25);
        assert!(records.iter().all(|r| r.value == 0.05));
        assert!(dir.join("hourly_electricity_rates_AT.png").is_file());
    }
}
