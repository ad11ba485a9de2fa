use std::{env, fs};
use chrono_tz::Tz;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

const API_KEY_ENV: &str = "ENTSOE_API_KEY";

#[derive(Deserialize)]
pub struct EntsoeParameters {
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize)]
pub struct Market {
    pub countries: Vec<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_day_offset")]
    pub day_offset: i64,
    #[serde(skip)]
    pub tz: Option<Tz>,
}

#[derive(Deserialize)]
pub struct Files {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

#[derive(Deserialize)]
pub struct ChartParameters {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

#[derive(Deserialize)]
pub struct General {
    #[serde(default = "default_log_path")]
    pub log_path: String,
    pub log_level: LevelFilter,
    #[serde(default)]
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub entsoe: EntsoeParameters,
    pub market: Market,
    #[serde(default)]
    pub files: Files,
    #[serde(default)]
    pub chart: ChartParameters,
    pub general: General,
}

impl Default for Files {
    fn default() -> Self {
        Self { output_dir: default_output_dir() }
    }
}

impl Default for ChartParameters {
    fn default() -> Self {
        Self { width: default_chart_width(), height: default_chart_height() }
    }
}

impl Market {
    /// Returns the parsed market timezone
    ///
    pub fn market_timezone(&self) -> Result<Tz, LoadConfigurationError> {
        match self.tz {
            Some(tz) => Ok(tz),
            None => parse_timezone(&self.timezone),
        }
    }
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, LoadConfigurationError> {
    let toml = fs::read_to_string(config_path)
        .map_err(|e| LoadConfigurationError::FileError(format!("{}: {}", config_path, e)))?;

    let mut config = parse_config(&toml)?;

    if let Ok(api_key) = env::var(API_KEY_ENV) {
        if !api_key.is_empty() {
            config.entsoe.api_key = api_key;
        }
    }

    Ok(config)
}

/// Parses configuration from a TOML string and resolves the market timezone
///
/// # Arguments
///
/// * 'toml' - configuration in TOML format
pub fn parse_config(toml: &str) -> Result<Config, LoadConfigurationError> {
    let mut config: Config = toml::from_str(toml)?;
    config.market.tz = Some(parse_timezone(&config.market.timezone)?);

    Ok(config)
}

fn parse_timezone(name: &str) -> Result<Tz, LoadConfigurationError> {
    name.parse::<Tz>()
        .map_err(|_| LoadConfigurationError::TimezoneError(name.to_string()))
}

fn default_api_url() -> String { "https://web-api.tp.entsoe.eu/api".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_timezone() -> String { "Europe/Brussels".to_string() }
fn default_day_offset() -> i64 { -1 }
fn default_output_dir() -> String { ".".to_string() }
fn default_chart_width() -> u32 { 1024 }
fn default_chart_height() -> u32 { 768 }
fn default_log_path() -> String { "entsoe_connector.log".to_string() }

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("FileError: {0}")]
    FileError(String),
    #[error("ParseError: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TimezoneError: unknown timezone {0}")]
    TimezoneError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [entsoe]
        api_key = "secret"

        [market]
        countries = ["AT", "BE"]

        [general]
        log_level = "info"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config(MINIMAL).unwrap();

        assert_eq!(config.entsoe.api_key, "secret");
        assert_eq!(config.entsoe.api_url, "https://web-api.tp.entsoe.eu/api");
        assert_eq!(config.entsoe.timeout_secs, 30);
        assert_eq!(config.market.countries, vec!["AT".to_string(), "BE".to_string()]);
        assert_eq!(config.market.day_offset, -1);
        assert_eq!(config.market.market_timezone().unwrap(), chrono_tz::Europe::Brussels);
        assert_eq!(config.files.output_dir, ".");
        assert_eq!(config.chart.width, 1024);
        assert_eq!(config.chart.height, 768);
        assert_eq!(config.general.log_path, "entsoe_connector.log");
        assert_eq!(config.general.log_level, LevelFilter::Info);
        assert!(!config.general.log_to_stdout);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let toml = r#"
            [entsoe]
            api_key = "secret"
            timeout_secs = 5

            [market]
            countries = ["SE_4"]
            timezone = "Europe/Stockholm"
            day_offset = 1

            [files]
            output_dir = "/tmp/rates"

            [chart]
            width = 640
            height = 480

            [general]
            log_path = "/var/log/rates.log"
            log_level = "debug"
            log_to_stdout = true
        "#;
        let config = parse_config(toml).unwrap();

        assert_eq!(config.entsoe.timeout_secs, 5);
        assert_eq!(config.market.day_offset, 1);
        assert_eq!(config.market.market_timezone().unwrap(), chrono_tz::Europe::Stockholm);
        assert_eq!(config.files.output_dir, "/tmp/rates");
        assert_eq!(config.chart.width, 640);
        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert!(config.general.log_to_stdout);
    }

    #[test]
    fn partial_chart_section() {
        let toml = format!("{}\n[chart]\nwidth = 800\n", MINIMAL);
        let config = parse_config(&toml).unwrap();

        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 768);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let toml = MINIMAL.replace("countries = [\"AT\", \"BE\"]", "countries = [\"AT\"]\ntimezone = \"Mars/Olympus\"");
        let err = parse_config(&toml).err().unwrap();

        assert!(matches!(err, LoadConfigurationError::TimezoneError(tz) if tz == "Mars/Olympus"));
    }

    #[test]
    fn missing_api_key_fails() {
        let toml = MINIMAL.replace("api_key = \"secret\"", "");

        assert!(matches!(parse_config(&toml), Err(LoadConfigurationError::ParseError(_))));
    }
}
