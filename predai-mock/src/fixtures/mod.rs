//! Raw sample builders shaped like history API payloads.

use chrono::{DateTime, Duration, Utc};
use predai_core::RawSample;

/// Parse an RFC 3339 timestamp; panics on malformed input.
#[must_use]
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|e| panic!("bad fixture timestamp {s}: {e}"))
        .with_timezone(&Utc)
}

/// A cumulative meter reading `start + i * increment` every `step_minutes`.
#[must_use]
pub fn meter_samples(
    from: DateTime<Utc>,
    step_minutes: i64,
    count: usize,
    start: f64,
    increment: f64,
) -> Vec<RawSample> {
    (0..count)
        .map(|i| {
            RawSample::at(
                from + Duration::minutes(step_minutes * i as i64),
                (i as f64).mul_add(increment, start),
            )
        })
        .collect()
}

/// An instantaneous reading following `f(i)` every `step_minutes`.
pub fn sensor_samples(
    from: DateTime<Utc>,
    step_minutes: i64,
    count: usize,
    f: impl Fn(usize) -> f64,
) -> Vec<RawSample> {
    (0..count)
        .map(|i| RawSample::at(from + Duration::minutes(step_minutes * i as i64), f(i)))
        .collect()
}

/// Replace the state of the samples at `indices` with `state`.
#[must_use]
pub fn with_state_at(mut samples: Vec<RawSample>, indices: &[usize], state: &str) -> Vec<RawSample> {
    for &i in indices {
        if let Some(s) = samples.get_mut(i) {
            s.state = state.to_string();
        }
    }
    samples
}
