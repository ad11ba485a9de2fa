use anyhow::Result;
use log::error;
use crate::initialization::init;
use crate::worker::{run, WorkerError};

mod chart;
mod config;
mod fetcher;
mod initialization;
mod logging;
mod manager_entsoe;
pub mod models;
mod worker;
#[cfg(test)]
mod test_log;

fn main() -> Result<()> {
    // If initialization fails we can't even log, so the error goes to stderr only
    let (config, mgr) = init()?;

    // Failing countries are already logged one by one
    if let Err(e) = run(&config, &mgr) {
        if !matches!(e, WorkerError::CountriesError(_)) {
            error!("Run failed: {}", e);
        }
        return Err(e)?;
    }

    Ok(())
}
