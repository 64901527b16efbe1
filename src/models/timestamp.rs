use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Canonical output format for every timestamp the API returns
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"];

/// Timestamp parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}', expected format \"YYYY-MM-DD HH:MM:SS\"")]
pub struct TimestampError(pub String);

/// Parse a timestamp from any accepted input representation.
///
/// Offset-free inputs are read as UTC. Sub-second precision is dropped so the
/// stored value always matches its canonical rendering.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = input.trim();

    let parsed = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .ok_or_else(|| TimestampError(input.to_string()))?;

    parsed
        .with_nanosecond(0)
        .ok_or_else(|| TimestampError(input.to_string()))
}

/// Parse a window bound; a bare date means midnight UTC
pub fn parse_window_bound(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    parse_timestamp(input).or_else(|err| {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or(err)
    })
}

/// Render a timestamp in the canonical format
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

/// Truncate to whole seconds; used for `now()`-derived window bounds
pub fn truncate_to_seconds(value: DateTime<Utc>) -> DateTime<Utc> {
    value.with_nanosecond(0).unwrap_or(value)
}

/// Serde adapter: `#[serde(with = "crate::models::timestamp::canonical")]`
pub mod canonical {
    use super::*;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
