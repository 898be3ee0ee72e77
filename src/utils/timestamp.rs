use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc};

use crate::error::{MonitorError, Result};

/// Storage format for every instant: UTC, second precision.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Which end of a date range a user-supplied filter value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

/// Truncate an instant to whole seconds.
pub fn canonicalize(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

/// Render an instant in the canonical storage form, e.g. `2024-01-15T12:00:00Z`.
pub fn format_canonical(instant: &DateTime<Utc>) -> String {
    canonicalize(*instant).format(CANONICAL_FORMAT).to_string()
}

/// Parse a stored or provider timestamp into a canonical UTC instant.
///
/// Accepts RFC 3339 with any offset, and naive `YYYY-MM-DDTHH:MM[:SS]` or
/// `YYYY-MM-DD HH:MM:SS` forms which are taken to be UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(canonicalize(dt.with_timezone(&Utc)));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(canonicalize(Utc.from_utc_datetime(&naive)));
        }
    }

    Err(MonitorError::InvalidFilter(format!(
        "Unrecognised timestamp '{}'",
        value
    )))
}

/// Parse a user-supplied filter bound.
///
/// A bare date expands to the first second of the day for a start bound and
/// the last second of the day for an end bound, so both bounds stay inclusive.
pub fn parse_filter_bound(value: &str, bound: RangeBound) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let time = match bound {
            RangeBound::Start => NaiveTime::MIN,
            RangeBound::End => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        };
        return Ok(Utc.from_utc_datetime(&date.and_time(time)));
    }

    parse_timestamp(trimmed).map_err(|_| {
        MonitorError::InvalidFilter(format!(
            "'{}' is not a date (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)",
            value
        ))
    })
}

/// Serde adapter that reads and writes instants in the canonical form.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_canonical(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
