pub mod errors;
mod areas;
mod models;

use std::collections::BTreeMap;
use std::time::Duration;
use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use crate::config::EntsoeParameters;
use crate::manager_entsoe::errors::EntsoeError;
use crate::manager_entsoe::models::{AcknowledgementMarketDocument, Period, PublicationMarketDocument};

pub use areas::area_code;

/// ENTSO-E reason code for an empty result
const NO_MATCHING_DATA: &str = "999";

/// A provider of day ahead prices
pub trait PriceSource {
    /// Returns hourly prices in EUR/MWh, ordered by time, for the window `[start, end)`
    ///
    /// # Arguments
    ///
    /// * 'country' - country or bidding zone code
    /// * 'start' - start of the window
    /// * 'end' - end of the window (non-inclusive)
    fn day_ahead_prices(&self, country: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError>;
}

/// Client for the ENTSO-E Transparency Platform
pub struct Entsoe {
    client: Client,
    api_url: String,
    api_key: String,
}

impl Entsoe {
    /// Returns a new Entsoe client
    ///
    /// # Arguments
    ///
    /// * 'config' - ENTSO-E configuration parameters
    pub fn new(config: &EntsoeParameters) -> Result<Entsoe, EntsoeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Entsoe {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl PriceSource for Entsoe {
    fn day_ahead_prices(&self, country: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError> {
        // https://web-api.tp.entsoe.eu/api?documentType=A44&in_Domain=10YAT-APG------L&out_Domain=10YAT-APG------L&periodStart=202312312300&periodEnd=202401012300
        let area = area_code(country)?;
        let period_start = start.format("%Y%m%d%H%M").to_string();
        let period_end = end.format("%Y%m%d%H%M").to_string();
        let query = vec![
            ("documentType", "A44"),
            ("in_Domain", area.as_str()),
            ("out_Domain", area.as_str()),
            ("periodStart", period_start.as_str()),
            ("periodEnd", period_end.as_str()),
            ("contract_MarketAgreement.type", "A01"),
            ("securityToken", self.api_key.as_str()),
        ];

        debug!("requesting day ahead prices for {} ({}) {} - {}", country, area, period_start, period_end);

        let response = self.client
            .get(&self.api_url)
            .query(&query)
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(EntsoeError::UnauthorizedError);
        }

        let xml = response.text()?;

        // The platform signals both empty results and rejected queries with an acknowledgement,
        // sometimes together with a 200 status
        if is_acknowledgement(&xml) {
            return Err(acknowledgement_error(&xml));
        }
        if !status.is_success() {
            return Err(EntsoeError::StatusError(status.as_u16(), xml.chars().take(200).collect()));
        }

        parse_day_ahead_prices(&xml, start, end)
    }
}

/// Parses a day ahead price document into hourly prices for the window `[start, end)`.
///
/// Hourly periods are used when the document has any; otherwise sub hourly points are
/// averaged per hour. Points sharing a timestamp across periods are only counted once.
///
/// # Arguments
///
/// * 'xml' - the publication market document
/// * 'start' - start of the window
/// * 'end' - end of the window (non-inclusive)
pub fn parse_day_ahead_prices(xml: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<f64>, EntsoeError> {
    let document: PublicationMarketDocument = quick_xml::de::from_str(xml)
        .map_err(|e| EntsoeError::DocumentError(e.to_string()))?;

    let hour = TimeDelta::hours(1);
    let mut hourly: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
    let mut sub_hourly: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();

    for series in document.time_series.iter() {
        let forward_fill = series.curve_type.as_deref() == Some("A03");
        for period in series.periods.iter() {
            let resolution = parse_resolution(&period.resolution)?;
            let target = if resolution == hour {
                &mut hourly
            } else if resolution < hour && hour.num_minutes() % resolution.num_minutes() == 0 {
                &mut sub_hourly
            } else {
                return Err(EntsoeError::ResolutionError(period.resolution.clone()));
            };

            for (time, price) in period_points(period, resolution, forward_fill)? {
                target.insert(time, price);
            }
        }
    }

    if hourly.is_empty() {
        hourly = hourly_means(&sub_hourly)?;
    }

    Ok(hourly
        .range(start..end)
        .map(|(_, price)| *price)
        .collect())
}

/// Expands a period into timestamped prices.
/// With curve type A03 the platform leaves out points repeating the previous price,
/// those positions get the last seen price.
///
/// # Arguments
///
/// * 'period' - the period to expand
/// * 'resolution' - time between two positions
/// * 'forward_fill' - whether missing positions repeat the previous price
fn period_points(period: &Period, resolution: TimeDelta, forward_fill: bool) -> Result<Vec<(DateTime<Utc>, f64)>, EntsoeError> {
    let period_start = parse_time(&period.time_interval.start)?;
    let period_end = parse_time(&period.time_interval.end)?;
    let slots = (period_end - period_start).num_minutes() / resolution.num_minutes();

    let by_position: BTreeMap<i64, f64> = period.points
        .iter()
        .map(|p| (p.position as i64, p.price_amount))
        .collect();

    let mut result = Vec::new();
    let mut last: Option<f64> = None;
    for position in 1..=slots {
        let price = match by_position.get(&position) {
            Some(price) => Some(*price),
            None if forward_fill => last,
            None => None,
        };

        if let Some(price) = price {
            result.push((period_start + resolution * (position - 1) as i32, price));
            last = Some(price);
        }
    }

    Ok(result)
}

/// Averages sub hourly prices into hourly prices
///
/// # Arguments
///
/// * 'prices' - timestamped prices with a resolution below one hour
fn hourly_means(prices: &BTreeMap<DateTime<Utc>, f64>) -> Result<BTreeMap<DateTime<Utc>, f64>, EntsoeError> {
    let mut groups: BTreeMap<DateTime<Utc>, (f64, f64)> = BTreeMap::new();

    for (time, price) in prices.iter() {
        let hour = time.duration_trunc(TimeDelta::hours(1))
            .map_err(|e| EntsoeError::DocumentError(format!("point time {}: {}", time, e)))?;
        groups.entry(hour)
            .and_modify(|v| { v.0 += *price; v.1 += 1.0; })
            .or_insert((*price, 1.0));
    }

    Ok(groups
        .into_iter()
        .map(|(hour, (sum, count))| (hour, sum / count))
        .collect())
}

/// Parses an ISO 8601 duration as used by the platform, e.g. 'PT15M' or 'PT60M'
///
/// # Arguments
///
/// * 'resolution' - the resolution attribute of a period
fn parse_resolution(resolution: &str) -> Result<TimeDelta, EntsoeError> {
    let err = || EntsoeError::ResolutionError(resolution.to_string());

    let value = resolution.strip_prefix("PT").ok_or_else(err)?;
    let unit = value.chars().last().ok_or_else(err)?;
    let amount = value[..value.len() - unit.len_utf8()].parse::<i64>().map_err(|_| err())?;

    let delta = match unit {
        'M' => TimeDelta::try_minutes(amount),
        'H' => TimeDelta::try_hours(amount),
        _ => None,
    }.ok_or_else(err)?;
    if delta <= TimeDelta::zero() {
        return Err(err());
    }

    Ok(delta)
}

/// Parses the minute precision UTC timestamps used in time intervals, e.g. '2023-12-31T23:00Z'
///
/// # Arguments
///
/// * 'time' - the timestamp to parse
fn parse_time(time: &str) -> Result<DateTime<Utc>, EntsoeError> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%MZ")
        .map(|t| t.and_utc())
        .map_err(|e| EntsoeError::DocumentError(format!("time {}: {}", time, e)))
}

fn is_acknowledgement(xml: &str) -> bool {
    xml.contains("<Acknowledgement_MarketDocument")
}

/// Maps an acknowledgement document to the error it represents
///
/// # Arguments
///
/// * 'xml' - the acknowledgement market document
fn acknowledgement_error(xml: &str) -> EntsoeError {
    let document: AcknowledgementMarketDocument = match quick_xml::de::from_str(xml) {
        Ok(d) => d,
        Err(e) => return EntsoeError::DocumentError(format!("acknowledgement: {}", e)),
    };

    if document.reasons.iter().any(|r| r.code == NO_MATCHING_DATA) {
        return EntsoeError::NoMatchingDataError;
    }

    let text = document.reasons
        .iter()
        .map(|r| format!("{}: {}", r.code, r.text))
        .collect::<Vec<String>>()
        .join(", ");

    EntsoeError::AcknowledgementError(text)
}
