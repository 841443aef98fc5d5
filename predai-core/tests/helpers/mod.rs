#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use predai_core::RawSample;

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn t0() -> DateTime<Utc> {
    ts("2024-03-01T00:00:00Z")
}

/// One raw sample every `step_minutes` from `start`, with the given values.
pub fn raw_every(start: DateTime<Utc>, step_minutes: i64, values: &[f64]) -> Vec<RawSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| RawSample::at(start + Duration::minutes(step_minutes * i as i64), *v))
        .collect()
}

pub fn values(points: &[predai_core::Point]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}
