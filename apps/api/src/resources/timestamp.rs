//! Lenient parsing for caller-supplied timestamps.
//!
//! Accepts RFC 3339 with an offset, a naive ISO-8601 date-time (seconds
//! optional, trailing `Z` optional) taken to be UTC, a bare date as midnight
//! UTC, or a Unix epoch given as a number or numeric string. Epochs whose
//! magnitude exceeds `MILLIS_THRESHOLD` are read as milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// 2e10 seconds is in the year 2603; anything larger is milliseconds.
const MILLIS_THRESHOLD: i64 = 20_000_000_000;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    if let Ok(secs) = raw.parse::<i64>() {
        return from_epoch_int(secs);
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return from_epoch_float(secs);
    }

    Err(format!("invalid ISO-8601 timestamp '{raw}'"))
}

pub fn from_epoch_int(value: i64) -> Result<DateTime<Utc>, String> {
    let parsed = if value.unsigned_abs() > MILLIS_THRESHOLD as u64 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    };
    parsed.ok_or_else(|| format!("epoch timestamp {value} is out of range"))
}

pub fn from_epoch_float(value: f64) -> Result<DateTime<Utc>, String> {
    if !value.is_finite() {
        return Err(format!("epoch timestamp {value} is not a finite number"));
    }
    let secs = if value.abs() > MILLIS_THRESHOLD as f64 {
        value / 1000.0
    } else {
        value
    };

    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(format!("epoch timestamp {value} is out of range"));
    }
    Utc.timestamp_opt(whole as i64, nanos)
        .single()
        .ok_or_else(|| format!("epoch timestamp {value} is out of range"))
}

/// `#[serde(deserialize_with = "timestamp::deserialize")]`
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(secs) => from_epoch_int(secs),
        RawTimestamp::Float(secs) => from_epoch_float(secs),
        RawTimestamp::Text(raw) => parse(&raw),
    };
    parsed.map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[derive(Deserialize)]
    struct Reading {
        #[serde(deserialize_with = "deserialize")]
        at: DateTime<Utc>,
    }

    fn from_json(value: serde_json::Value) -> Result<DateTime<Utc>, serde_json::Error> {
        serde_json::from_value::<Reading>(json!({ "at": value })).map(|r| r.at)
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            parse("2024-01-01T09:00:00+09:00").unwrap(),
            utc("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_naive_is_utc() {
        assert_eq!(parse("2024-01-01T00:00:00").unwrap(), utc("2024-01-01T00:00:00Z"));
        assert_eq!(
            parse("2024-01-01 12:30:00.250").unwrap(),
            utc("2024-01-01T12:30:00.250Z")
        );
    }

    #[test]
    fn test_minutes_precision() {
        assert_eq!(parse("2024-01-01T10:30").unwrap(), utc("2024-01-01T10:30:00Z"));
        assert_eq!(parse("2024-01-01T10:30Z").unwrap(), utc("2024-01-01T10:30:00Z"));
        assert_eq!(
            parse("2024-01-01T10:30+02:00").unwrap(),
            utc("2024-01-01T08:30:00Z")
        );
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        assert_eq!(parse("2024-01-01").unwrap(), utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(from_epoch_int(1_704_067_200).unwrap(), utc("2024-01-01T00:00:00Z"));
        assert_eq!(
            from_epoch_float(1_704_067_200.5).unwrap(),
            utc("2024-01-01T00:00:00.500Z")
        );
        assert_eq!(parse("1704067200").unwrap(), utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_large_epochs_are_milliseconds() {
        assert_eq!(
            from_epoch_int(1_704_067_200_123).unwrap(),
            utc("2024-01-01T00:00:00.123Z")
        );
        assert_eq!(
            from_epoch_float(1_704_067_200_500.0).unwrap(),
            utc("2024-01-01T00:00:00.500Z")
        );
        // Just under the threshold is still seconds.
        assert_eq!(from_epoch_int(19_999_999_999).unwrap().timestamp(), 19_999_999_999);
    }

    #[test]
    fn test_deserialize_accepts_every_form() {
        let midnight = utc("2024-01-01T00:00:00Z");
        let half_ten = utc("2024-01-01T10:30:00Z");

        assert_eq!(from_json(json!(1_704_067_200)).unwrap(), midnight);
        assert_eq!(from_json(json!(1_704_067_200_000_i64)).unwrap(), midnight);
        assert_eq!(
            from_json(json!(1_704_067_200.25)).unwrap(),
            utc("2024-01-01T00:00:00.250Z")
        );
        assert_eq!(from_json(json!("2024-01-01")).unwrap(), midnight);
        assert_eq!(from_json(json!("2024-01-01T10:30")).unwrap(), half_ten);
        assert_eq!(from_json(json!("2024-01-01T10:30Z")).unwrap(), half_ten);
        assert_eq!(from_json(json!("2024-01-01T00:00:00Z")).unwrap(), midnight);
    }

    #[test]
    fn test_garbage() {
        assert!(parse("yesterday").is_err());
        assert!(parse("").is_err());
        assert!(parse("2024-13-01").is_err());
        assert!(parse("NaN").is_err());
        assert!(from_epoch_float(f64::INFINITY).is_err());
        assert!(from_json(json!(true)).is_err());
        assert!(from_json(json!(null)).is_err());
    }
}
