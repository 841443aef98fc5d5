//! Timestamp parsing and truncation helpers for history API payloads.

use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};

use crate::PredaiError;

/// Home Assistant timestamp layout without fractional seconds.
pub const HA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
/// Home Assistant timestamp layout with fractional seconds.
pub const HA_FORMAT_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parse an ISO-8601 timestamp with UTC offset and truncate it to the minute.
///
/// Accepts RFC 3339 (`2024-03-01T10:15:42.123+00:00`) as well as the offset
/// without a colon (`2024-03-01T10:15:42+0000`), with or without fractional
/// seconds. Returns `None` for anything else.
///
/// ```
/// use predai_core::timeseries::timestamp::parse_timestamp;
/// let ts = parse_timestamp("2024-03-01T10:15:42.123456+00:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-03-01T10:15:00+00:00");
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, HA_FORMAT))
        .or_else(|_| DateTime::parse_from_str(raw, HA_FORMAT_FRACTIONAL))
        .ok()?;
    truncate_to_minute(parsed.with_timezone(&Utc))
}

/// Zero seconds and sub-seconds.
#[must_use]
pub fn truncate_to_minute(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    ts.with_second(0)?.with_nanosecond(0)
}

/// Zero minutes, seconds, and sub-seconds.
#[must_use]
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::hours(1)).unwrap_or(ts)
}

/// Format a timestamp in the Home Assistant layout (`+0000` style offset).
#[must_use]
pub fn format_ha(ts: DateTime<Utc>) -> String {
    ts.format(HA_FORMAT).to_string()
}

/// Start of a `days`-long window ending at `now`.
///
/// # Errors
/// Returns `InvalidArg` when the start falls outside the representable
/// calendar range.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use predai_core::timeseries::timestamp::days_before;
/// let now = DateTime::parse_from_rfc3339("2024-03-08T00:00:00Z").unwrap().with_timezone(&Utc);
/// assert_eq!(days_before(now, 7).unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
/// assert!(days_before(now, 200_000_000).is_err());
/// ```
pub fn days_before(now: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>, PredaiError> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            PredaiError::InvalidArg(format!("a {days}-day history window before {now} is out of range"))
        })
}
