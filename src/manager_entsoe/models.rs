use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

#[derive(Deserialize, Debug)]
pub struct Point {
    pub position: u32,
    #[serde(rename = "price.amount")]
    pub price_amount: f64,
}

#[derive(Deserialize, Debug)]
pub struct Period {
    #[serde(rename = "timeInterval")]
    pub time_interval: TimeInterval,
    pub resolution: String,
    #[serde(rename = "Point", default)]
    pub points: Vec<Point>,
}

#[derive(Deserialize, Debug)]
pub struct TimeSeries {
    #[serde(rename = "curveType", default)]
    pub curve_type: Option<String>,
    #[serde(rename = "Period", default)]
    pub periods: Vec<Period>,
}

/// Root of a successful day ahead price response (document type A44)
#[derive(Deserialize, Debug)]
pub struct PublicationMarketDocument {
    #[serde(rename = "TimeSeries", default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Deserialize, Debug)]
pub struct Reason {
    pub code: String,
    #[serde(default)]
    pub text: String,
}

/// Root of a response where the platform declined to deliver data
#[derive(Deserialize, Debug)]
pub struct AcknowledgementMarketDocument {
    #[serde(rename = "Reason", default)]
    pub reasons: Vec<Reason>,
}
