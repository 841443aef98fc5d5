use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::Point;

/// Index a series by timestamp. Later duplicates replace earlier ones.
#[must_use]
pub fn index_by_ts(series: &[Point]) -> BTreeMap<DateTime<Utc>, f64> {
    series.iter().map(|p| (p.ts, p.value)).collect()
}

/// Subtract `secondary` from `primary`, aligned by exact timestamp.
///
/// - Left outer join: every `primary` point is kept, in order; a missing
///   `secondary` timestamp subtracts zero.
/// - `secondary` points without a `primary` match are ignored.
/// - When `incrementing`, results are floored at zero.
///
/// ```
/// use chrono::{DateTime, Duration, Utc};
/// use predai_core::{Point, timeseries::subtract::subtract};
///
/// let t1 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
/// let t2 = t1 + Duration::minutes(30);
/// let out = subtract(
///     vec![Point::new(t1, 10.0), Point::new(t2, 20.0)],
///     &[Point::new(t1, 3.0)],
///     true,
/// );
/// assert_eq!(out, vec![Point::new(t1, 7.0), Point::new(t2, 20.0)]);
/// ```
#[must_use]
pub fn subtract(primary: Vec<Point>, secondary: &[Point], incrementing: bool) -> Vec<Point> {
    let index = index_by_ts(secondary);
    #[cfg(feature = "tracing")]
    let mut matched = 0usize;

    let out: Vec<Point> = primary
        .into_iter()
        .map(|p| {
            let sub = index.get(&p.ts).copied().unwrap_or(0.0);
            #[cfg(feature = "tracing")]
            if index.contains_key(&p.ts) {
                matched += 1;
            }
            let value = if incrementing {
                (p.value - sub).max(0.0)
            } else {
                p.value - sub
            };
            Point::new(p.ts, value)
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(matched, rows = out.len(), "subtracted series");

    out
}

/// Apply several subtractions in order.
#[must_use]
pub fn subtract_all(primary: Vec<Point>, secondaries: &[Vec<Point>], incrementing: bool) -> Vec<Point> {
    secondaries
        .iter()
        .fold(primary, |acc, s| subtract(acc, s, incrementing))
}
