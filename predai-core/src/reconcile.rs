//! Turn forecasting engine output into the published series.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::StateUpdate;
use crate::ForecastRow;
use crate::timeseries::timestamp::HA_FORMAT;

/// Options for [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Publish running totals instead of per-tick values.
    pub incrementing: bool,
    /// Restart running totals at local midnight (historic rows only).
    pub reset_daily: bool,
    /// Rows older than this many days before `anchor_now` are not published.
    pub history_window_days: u32,
    /// Zone in which "midnight" is evaluated.
    pub timezone: Tz,
    /// The engine's notion of "now"; defaults to `anchor_now`.
    pub model_now: Option<DateTime<Utc>>,
}

impl ReconcileOptions {
    /// Instantaneous output in UTC with a `history_window_days` window.
    #[must_use]
    pub const fn new(history_window_days: u32) -> Self {
        Self {
            incrementing: false,
            reset_daily: false,
            history_window_days,
            timezone: Tz::UTC,
            model_now: None,
        }
    }

    /// Switch to running totals.
    #[must_use]
    pub const fn meter(mut self, reset_daily: bool) -> Self {
        self.incrementing = true;
        self.reset_daily = reset_daily;
        self
    }

    /// Evaluate midnight in `tz`.
    #[must_use]
    pub const fn in_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the engine clock when it differs from the publishing clock.
    #[must_use]
    pub const fn with_model_now(mut self, model_now: DateTime<Utc>) -> Self {
        self.model_now = Some(model_now);
        self
    }
}

/// Reconciled prediction ready for publishing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciled {
    /// Final state: last running total, or last predicted value.
    pub state: f64,
    /// Predicted series keyed by published timestamp.
    pub results: BTreeMap<DateTime<Utc>, f64>,
    /// Actual series keyed by published timestamp (present values only).
    pub source: BTreeMap<DateTime<Utc>, f64>,
}

/// Round to two decimal places.
#[must_use]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn is_local_midnight(ts: DateTime<Utc>, tz: Tz) -> bool {
    let local = ts.with_timezone(&tz);
    local.hour() == 0 && local.minute() == 0
}

/// Map engine rows onto the publishing clock and accumulate them.
///
/// Each row is shifted by its offset from the model clock onto `anchor_now`.
/// Running totals of predictions and actuals are kept over every row, even
/// those outside the published history window, so the first published total
/// reflects everything before it.
///
/// ```
/// use chrono::{DateTime, Duration, Utc};
/// use predai_core::ForecastRow;
/// use predai_core::reconcile::{reconcile, ReconcileOptions};
///
/// let now = DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z").unwrap().with_timezone(&Utc);
/// let rows: Vec<ForecastRow> = (0..3)
///     .map(|i| ForecastRow { ts: now + Duration::minutes(30 * i), predicted: 1.0, actual: None })
///     .collect();
/// let out = reconcile(&rows, now, ReconcileOptions::new(7).meter(false));
/// assert_eq!(out.state, 3.0);
/// assert!(out.source.is_empty());
/// ```
#[must_use]
pub fn reconcile(rows: &[ForecastRow], anchor_now: DateTime<Utc>, opts: ReconcileOptions) -> Reconciled {
    let model_now = opts.model_now.unwrap_or(anchor_now);
    let window = Duration::days(i64::from(opts.history_window_days));
    let mut total_pred = 0.0;
    let mut total_actual = 0.0;
    let mut last_pred = 0.0;
    let mut out = Reconciled::default();

    for row in rows {
        let offset = row.ts - model_now;
        let published = anchor_now + offset;

        if opts.reset_daily && published <= anchor_now && is_local_midnight(published, opts.timezone) {
            total_pred = 0.0;
            total_actual = 0.0;
        }

        total_pred += row.predicted;
        last_pred = row.predicted;
        let actual = row.actual.filter(|v| v.is_finite());
        if let Some(a) = actual {
            total_actual += a;
        }

        if offset < -window {
            continue;
        }

        if opts.incrementing {
            out.results.insert(published, round2(total_pred));
            if actual.is_some() {
                out.source.insert(published, round2(total_actual));
            }
        } else {
            out.results.insert(published, round2(row.predicted));
            if let Some(a) = actual {
                out.source.insert(published, round2(a));
            }
        }
    }

    out.state = if rows.is_empty() {
        0.0
    } else if opts.incrementing {
        round2(total_pred)
    } else {
        round2(last_pred)
    };
    out
}

fn series_to_json(series: &BTreeMap<DateTime<Utc>, f64>, tz: Tz) -> Value {
    let map: Map<String, Value> = series
        .iter()
        .map(|(ts, v)| (ts.with_timezone(&tz).format(HA_FORMAT).to_string(), Value::from(*v)))
        .collect();
    Value::Object(map)
}

impl Reconciled {
    /// Build the state payload published for the prediction entity.
    #[must_use]
    pub fn to_state_update(&self, now: DateTime<Utc>, units: &str, timezone: Tz) -> StateUpdate {
        StateUpdate::new(self.state)
            .with_attribute(
                "last_updated",
                now.with_timezone(&timezone)
                    .format("%Y-%m-%d %H:%M:%S%:z")
                    .to_string(),
            )
            .with_attribute("unit_of_measurement", units)
            .with_attribute("state_class", "measurement")
            .with_attribute("results", series_to_json(&self.results, timezone))
            .with_attribute("source", series_to_json(&self.source, timezone))
    }
}
