use chrono::{DateTime, Duration, Utc};

use crate::timeseries::timestamp::{parse_timestamp, truncate_to_hour};
use crate::{Point, RawSample};

/// How raw readings are turned into per-tick values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterParams {
    /// Treat the raw stream as a cumulative meter counter and emit per-tick deltas.
    pub incrementing: bool,
    /// Largest accepted jump between two readings; `0` disables spike filtering.
    pub max_increment: f64,
    /// A drop to below this value counts as a reset (strict `<`).
    pub reset_low: f64,
    /// The reading before the drop must exceed this value (strict `>`).
    pub reset_high: f64,
}

impl CounterParams {
    /// Instantaneous readings: values pass through unchanged.
    #[must_use]
    pub const fn instantaneous() -> Self {
        Self {
            incrementing: false,
            max_increment: 0.0,
            reset_low: 0.0,
            reset_high: 0.0,
        }
    }

    /// Cumulative meter readings with reset thresholds and no spike filter.
    #[must_use]
    pub const fn meter(reset_low: f64, reset_high: f64) -> Self {
        Self {
            incrementing: true,
            max_increment: 0.0,
            reset_low,
            reset_high,
        }
    }

    /// Enable the spike filter.
    #[must_use]
    pub const fn with_max_increment(mut self, max_increment: f64) -> Self {
        self.max_increment = max_increment;
        self
    }
}

impl Default for CounterParams {
    fn default() -> Self {
        Self::instantaneous()
    }
}

/// Accumulator state for one resampling pass.
///
/// `observe` feeds one raw reading, `flush` takes the value to emit at a tick.
/// For meter counters the running `total` holds the delta accumulated since
/// the previous flush.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterState {
    params: CounterParams,
    last_value: Option<f64>,
    total: f64,
}

impl CounterState {
    /// Fresh state; the first successfully parsed reading seeds `last_value`.
    #[must_use]
    pub const fn new(params: CounterParams) -> Self {
        Self {
            params,
            last_value: None,
            total: 0.0,
        }
    }

    /// Last (possibly filtered) reading, if any reading has been seen.
    #[must_use]
    pub const fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    /// Delta accumulated since the last flush.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Feed one reading and return the effective value.
    ///
    /// `None` (an unparseable state) is replaced by the last reading; it is
    /// skipped entirely, returning `None`, while no reading has been seen.
    pub fn observe(&mut self, reading: Option<f64>) -> Option<f64> {
        let mut value = match reading {
            Some(v) => v,
            None => self.last_value?,
        };
        let prev = *self.last_value.get_or_insert(value);

        if self.params.incrementing {
            if value < prev && value < self.params.reset_low && prev > self.params.reset_high {
                // Counter restarted near zero: the new reading is the whole delta.
                self.total += value;
            } else {
                if self.params.max_increment > 0.0 && (value - prev).abs() > self.params.max_increment
                {
                    value = prev;
                }
                self.total = (self.total + value - prev).max(0.0);
            }
        }

        self.last_value = Some(value);
        Some(value)
    }

    /// Value to emit at a tick.
    ///
    /// Meter counters emit the accumulated delta (never negative) and restart
    /// accumulation; instantaneous series emit the last reading.
    pub fn flush(&mut self) -> f64 {
        if self.params.incrementing {
            let out = self.total.max(0.0);
            self.total = 0.0;
            out
        } else {
            self.last_value.unwrap_or(0.0)
        }
    }
}

/// Options for [`resample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    /// Output cadence in minutes.
    pub period_minutes: i64,
    /// Counter interpretation.
    pub counter: CounterParams,
}

impl ResampleOptions {
    /// Options for a given cadence and counter interpretation.
    #[must_use]
    pub const fn new(period_minutes: i64, counter: CounterParams) -> Self {
        Self {
            period_minutes,
            counter,
        }
    }
}

/// Output of [`resample`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resampled {
    /// Uniform series, one point every `period_minutes` from the truncated start hour.
    pub points: Vec<Point>,
    /// Last raw (filtered) reading read before the walk passed `end`, `0.0`
    /// if none parsed. Samples after the final tick are never read.
    pub carry: f64,
}

/// Parse a raw state string as a finite number.
#[must_use]
pub fn parse_state(state: &str) -> Option<f64> {
    state.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert irregular raw samples into a uniform series.
///
/// - Ticks start at `start` truncated to the hour and advance by
///   `period_minutes` while `tick <= end`.
/// - Every sample updates the [`CounterState`]; a sample at or after the
///   current tick emits the flushed value at that tick. A sample that closes
///   a gap emits at every tick it covers, so gaps never produce missing rows.
/// - Samples before the current tick, or with an unparseable timestamp, only
///   update counter state.
///
/// Returns an empty series for empty input, all-non-numeric input,
/// `end < start`, or a non-positive period.
///
/// ```
/// use chrono::{DateTime, Duration, Utc};
/// use predai_core::timeseries::resample::{resample, CounterParams, ResampleOptions};
/// use predai_core::RawSample;
///
/// let t0 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
/// let raw: Vec<RawSample> = (0..4)
///     .map(|i| RawSample::at(t0 + Duration::minutes(30 * i), 10.0 + i as f64))
///     .collect();
/// let end = t0 + Duration::minutes(90);
/// let out = resample(&raw, t0, end, ResampleOptions::new(30, CounterParams::meter(1.0, 2.0)));
/// let deltas: Vec<f64> = out.points.iter().map(|p| p.value).collect();
/// assert_eq!(deltas, vec![0.0, 1.0, 1.0, 1.0]);
/// assert_eq!(out.carry, 13.0);
/// ```
#[must_use]
pub fn resample(
    raw: &[RawSample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    opts: ResampleOptions,
) -> Resampled {
    if raw.is_empty() || opts.period_minutes <= 0 || end < start {
        return Resampled::default();
    }
    let step = Duration::minutes(opts.period_minutes);
    let mut tick = truncate_to_hour(start);
    let mut state = CounterState::new(opts.counter);
    let mut out = Resampled::default();

    for sample in raw {
        if tick > end {
            break;
        }
        let Some(value) = state.observe(parse_state(&sample.state)) else {
            continue;
        };
        out.carry = value;

        let Some(ts) = parse_timestamp(&sample.last_updated) else {
            continue;
        };
        while ts >= tick && tick <= end {
            out.points.push(Point::new(tick, state.flush()));
            tick += step;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        raw = raw.len(),
        points = out.points.len(),
        incrementing = opts.counter.incrementing,
        "resampled raw history"
    );

    out
}
