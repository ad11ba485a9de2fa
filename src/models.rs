use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for the `from` attribute of a price interval
pub const INTERVAL_FORMAT: &str = "%d/%m/%Y %H:%M";

/// One hourly price, as persisted in the rates file
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct PriceInterval {
    #[serde(with = "interval_time")]
    pub from: NaiveDateTime,
    pub duration: u32,
    pub value: f64,
}

mod interval_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use super::INTERVAL_FORMAT;

    pub fn serialize<S>(date_time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date_time.format(INTERVAL_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, INTERVAL_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use super::*;

    #[test]
    fn serializes_with_day_month_year() {
        let interval = PriceInterval {
            from: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(13, 0, 0).unwrap(),
            duration: 60,
            value: 0.05,
        };

        let json = serde_json::to_string(&interval).unwrap();

        assert_eq!(json, r#"{"from":"02/01/2024 13:00","duration":60,"value":0.05}"#);
    }

    #[test]
    fn reads_rates_written_with_spaces() {
        let json = r#"[{"from": "01/01/2024 00:00", "duration": 60, "value": 0.05},
                       {"from": "01/01/2024 01:00", "duration": 60, "value": 0.1}]"#;

        let intervals: Vec<PriceInterval> = serde_json::from_str(json).unwrap();

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[1].from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(intervals[1].value, 0.1);
    }

    #[test]
    fn rejects_iso_timestamps() {
        let json = r#"{"from": "2024-01-01T00:00:00", "duration": 60, "value": 0.05}"#;

        assert!(serde_json::from_str::<PriceInterval>(json).is_err());
    }
}
