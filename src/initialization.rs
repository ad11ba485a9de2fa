use std::env;
use log::info;
use thiserror::Error;
use crate::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};
use crate::manager_entsoe::errors::EntsoeError;
use crate::manager_entsoe::{Entsoe, PriceSource};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub struct Mgr {
    pub prices: Box<dyn PriceSource>,
}

/// Initializes and returns configuration and a Mgr struct holding the price provider
///
pub fn init() -> Result<(Config, Mgr), InitializationError> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.iter()
        .find_map(|p| p.strip_prefix("--config="))
        .unwrap_or(DEFAULT_CONFIG_PATH);

    // Load configuration
    let config = load_config(config_path)?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting entsoe rates version: {}", env!("CARGO_PKG_VERSION"));

    let entsoe = Entsoe::new(&config.entsoe)?;

    let mgr = Mgr {
        prices: Box::new(entsoe),
    };

    Ok((config, mgr))
}

/// Error depicting errors that occur while initializing
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
    #[error("PriceProviderError: {0}")]
    PriceProviderError(#[from] EntsoeError),
}
