//! Wire timestamp parsing.
//!
//! The server sends extended ISO-8601 with a zone designator, sometimes with
//! fractional seconds and sometimes without. The fractional form is tried
//! first, then the whole-second form.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

// "YYYY-MM-DDTHH:MM:SS"
const SECONDS_END: usize = 19;
const DATE_TIME_SEPARATOR: usize = 10;

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_fractional(raw).or_else(|| parse_whole_seconds(raw))
}

fn parse_fractional(raw: &str) -> Option<DateTime<Utc>> {
    if !has_extended_layout(raw) || !has_fraction(raw) {
        return None;
    }
    parse_internet_date_time(raw)
}

fn parse_whole_seconds(raw: &str) -> Option<DateTime<Utc>> {
    if !has_extended_layout(raw) || has_fraction(raw) {
        return None;
    }
    parse_internet_date_time(raw)
}

fn parse_internet_date_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn has_extended_layout(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() > SECONDS_END && bytes[DATE_TIME_SEPARATOR] == b'T'
}

fn has_fraction(raw: &str) -> bool {
    raw.as_bytes().get(SECONDS_END) == Some(&b'.')
}

/// A date that must be present and valid.
pub fn deserialize_required<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("cannot decode date string {:?}", raw)))
}

/// A date that degrades to `None` when missing, null, mistyped or unparsable.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_whole_seconds_zulu() {
        let dt = parse_timestamp("2025-04-19T05:48:31Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 4, 19, 5, 48, 31).unwrap());
    }

    #[test]
    fn test_fractional_seconds_zulu() {
        let dt = parse_timestamp("2025-04-19T05:48:31.123Z").unwrap();
        assert_eq!(dt.timestamp(), 1745041711);
        assert_eq!(dt.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_both_variants_same_instant() {
        let whole = parse_timestamp("2025-04-19T05:48:31Z").unwrap();
        let fractional = parse_timestamp("2025-04-19T05:48:31.000Z").unwrap();
        assert_eq!(whole, fractional);
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let dt = parse_timestamp("2025-04-19T07:48:31+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 4, 19, 5, 48, 31).unwrap());

        let dt = parse_timestamp("2025-04-19T01:48:31.5-04:00").unwrap();
        assert_eq!(dt.timestamp(), 1745041711);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_microsecond_fraction() {
        let dt = parse_timestamp("2025-04-19T05:48:31.123456Z").unwrap();
        assert_eq!(dt.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn test_rejects_non_extended_forms() {
        for raw in [
            "",
            "2025-04-19",
            "2025-04-19T05:48:31",
            "2025-04-19T05:48:31.123",
            "2025-04-19 05:48:31Z",
            "2025-04-19t05:48:31Z",
            "20250419T054831Z",
            "Sat, 19 Apr 2025 05:48:31 GMT",
            "yesterday",
        ] {
            assert_eq!(parse_timestamp(raw), None, "{raw:?} should not parse");
        }
    }
}
