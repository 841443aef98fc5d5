use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use predai_core::connector::{ForecastFeatures, ForecastRequest};
use predai_core::reconcile::{ReconcileOptions, reconcile};
use predai_core::timeseries::resample::{CounterParams, ResampleOptions, resample};
use predai_core::{
    Capability, History, Point, PredaiConfig, PredaiError, RunReport, SensorConfig, SensorFailure,
    days_before, subtract_all, truncate_to_hour,
};

use crate::core::Predai;

/// What to fetch and how to normalise one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    /// Entity id of the series.
    pub entity_id: String,
    /// Days of history to fetch.
    pub days: u32,
    /// Output cadence in minutes.
    pub period_minutes: u32,
    /// Counter interpretation.
    pub counter: CounterParams,
    /// Merge with and persist to the dedup store.
    pub persist: bool,
}

impl SeriesSpec {
    /// Primary series settings of a sensor.
    #[must_use]
    pub fn primary(entity_id: impl Into<String>, sensor: &SensorConfig) -> Self {
        Self {
            entity_id: entity_id.into(),
            days: sensor.days,
            period_minutes: sensor.interval,
            counter: CounterParams {
                incrementing: sensor.incrementing,
                max_increment: sensor.max_increment,
                reset_low: sensor.reset_low,
                reset_high: sensor.reset_high,
            },
            persist: sensor.database,
        }
    }
}

/// A normalised series and the window it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Uniform series, merged with stored history when persisted.
    pub points: Vec<Point>,
    /// Start of the fetched window.
    pub start: DateTime<Utc>,
    /// End of the fetched window.
    pub end: DateTime<Utc>,
    /// Last raw reading seen while resampling.
    pub carry: f64,
}

/// Result of running one sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorOutcome {
    /// A prediction was published.
    Published {
        /// Entity that received the prediction.
        entity_id: String,
        /// Published state.
        state: f64,
        /// Number of training points.
        training_points: usize,
        /// Sensor settings the forecaster cannot use (`covariates`, `n_lags`,
        /// `country`); they were left out of the request.
        ignored: Vec<&'static str>,
    },
    /// Nothing was published.
    Skipped {
        /// Why the sensor was skipped.
        reason: String,
    },
}

/// Sensor settings that `features` cannot honour, by config key.
fn ignored_settings(sensor: &SensorConfig, features: ForecastFeatures) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !sensor.covariates.is_empty() && !features.regressors {
        out.push("covariates");
    }
    if sensor.n_lags > 0 && !features.lags {
        out.push("n_lags");
    }
    if sensor.country.is_some() && !features.holidays {
        out.push("country");
    }
    out
}

impl Predai {
    /// Fetch, resample and (optionally) persist one series.
    ///
    /// Never fails on collaborator trouble: a failed or timed-out fetch is
    /// treated as empty history, and a failing store falls back to the
    /// freshly resampled points.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "predai::prepare_series",
            skip(self, spec),
            fields(entity_id = %spec.entity_id, days = spec.days, persist = spec.persist),
        )
    )]
    pub async fn prepare_series(&self, spec: &SeriesSpec, now: DateTime<Utc>) -> PreparedSeries {
        let history = match Self::provider_call_with_timeout(
            self.history.name(),
            Capability::History.as_str(),
            self.cfg.provider_timeout,
            self.history.history(&spec.entity_id, now, spec.days),
        )
        .await
        {
            Ok(h) => h,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(entity_id = %spec.entity_id, error = %_e, "history fetch failed; using empty history");
                History::empty(days_before(now, spec.days).unwrap_or(now), now)
            }
        };

        let resampled = resample(
            &history.samples,
            history.start,
            history.end,
            ResampleOptions::new(i64::from(spec.period_minutes), spec.counter),
        );

        let points = match (&self.store, spec.persist) {
            (Some(_), true) => self.merge_with_store(&spec.entity_id, resampled.points).await,
            _ => resampled.points,
        };

        PreparedSeries {
            points,
            start: history.start,
            end: history.end,
            carry: resampled.carry,
        }
    }

    async fn merge_with_store(&self, series_id: &str, fresh: Vec<Point>) -> Vec<Point> {
        let Some(store) = &self.store else {
            return fresh;
        };
        let merged = async {
            store.ensure_table(series_id).await?;
            let known = store.read_all(series_id).await?;
            store.append_new(series_id, &fresh, known).await
        };
        match Self::provider_call_with_timeout(
            store.name(),
            Capability::Store.as_str(),
            self.cfg.provider_timeout,
            merged,
        )
        .await
        {
            Ok(points) => points,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(series_id, error = %_e, "dedup store failed; using fresh points");
                fresh
            }
        }
    }

    /// Run the full pipeline for one sensor and publish its prediction.
    ///
    /// `now` is truncated to the hour before use.
    ///
    /// Settings the forecaster cannot use are left out of the request and
    /// reported in [`SensorOutcome::Published`]; covariates are then not
    /// fetched at all.
    ///
    /// # Errors
    /// Returns `InvalidArg` when a history window reaches outside the
    /// calendar, and the forecaster's or publisher's error. Fetch and store
    /// failures only shrink the training data.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "predai::run_sensor", skip(self, sensor), fields(sensor = ?sensor.name))
    )]
    pub async fn run_sensor(
        &self,
        sensor: &SensorConfig,
        now: DateTime<Utc>,
    ) -> Result<SensorOutcome, PredaiError> {
        let (Some(name), Some(entity)) = (&sensor.name, sensor.prediction_entity()) else {
            return Ok(SensorOutcome::Skipped {
                reason: "sensor has no name".to_string(),
            });
        };
        let now = truncate_to_hour(now);
        let features = self.forecaster.features();
        let ignored = ignored_settings(sensor, features);

        days_before(now, sensor.days)?;
        if features.regressors {
            for cov in &sensor.covariates {
                days_before(now, cov.days.unwrap_or(sensor.days))?;
            }
        }
        #[cfg(feature = "tracing")]
        if !ignored.is_empty() {
            tracing::warn!(
                sensor = %name,
                forecaster = self.forecaster.name(),
                ignored = ?ignored,
                "forecaster does not support these settings; ignoring them"
            );
        }

        let primary_spec = SeriesSpec::primary(name.clone(), sensor);
        let primary = self.prepare_series(&primary_spec, now).await;

        let mut covariates = BTreeMap::new();
        if features.regressors {
            for cov in &sensor.covariates {
                let spec = SeriesSpec {
                    entity_id: cov.name.clone(),
                    days: cov.days.unwrap_or(sensor.days),
                    period_minutes: sensor.interval,
                    counter: CounterParams {
                        incrementing: cov.incrementing,
                        ..CounterParams::instantaneous()
                    },
                    persist: false,
                };
                let prepared = self.prepare_series(&spec, now).await;
                covariates.insert(cov.name.clone(), prepared.points);
            }
        }

        let mut subtracts = Vec::new();
        for sub in sensor.subtract_names() {
            let spec = SeriesSpec::primary(sub.clone(), sensor);
            subtracts.push(self.prepare_series(&spec, now).await.points);
        }
        let training = if subtracts.is_empty() {
            primary.points
        } else {
            subtract_all(primary.points, &subtracts, sensor.incrementing)
        };

        if training.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(sensor = %name, "no data to train on; skipping");
            return Ok(SensorOutcome::Skipped {
                reason: format!("no data for {name}"),
            });
        }
        let training_points = training.len();

        let req = ForecastRequest {
            series: training,
            covariates,
            period_minutes: sensor.interval,
            future_periods: sensor.future_periods,
            n_lags: if features.lags { sensor.n_lags } else { 0 },
            country: sensor.country.clone().filter(|_| features.holidays),
        };
        #[cfg(feature = "tracing")]
        if !req.covariates.is_empty() {
            let incomplete = req
                .training_table()
                .iter()
                .filter(|row| row.regressors.iter().any(Option::is_none))
                .count();
            tracing::debug!(
                regressors = ?req.regressor_names(),
                incomplete,
                "joined regressors onto training table"
            );
        }
        let rows = Self::provider_call_with_timeout(
            self.forecaster.name(),
            Capability::Forecast.as_str(),
            self.cfg.provider_timeout,
            self.forecaster.forecast(req),
        )
        .await?;

        let mut opts = ReconcileOptions::new(sensor.export_days()).in_timezone(self.cfg.timezone);
        if sensor.incrementing {
            opts = opts.meter(sensor.reset_daily);
        }
        let reconciled = reconcile(&rows, now, opts);
        let update = reconciled.to_state_update(now, &sensor.units, self.cfg.timezone);

        Self::provider_call_with_timeout(
            self.publisher.name(),
            Capability::SetState.as_str(),
            self.cfg.provider_timeout,
            self.publisher.set_state(&entity, update),
        )
        .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(entity = %entity, state = reconciled.state, training_points, "published prediction");

        Ok(SensorOutcome::Published {
            entity_id: entity,
            state: reconciled.state,
            training_points,
            ignored,
        })
    }

    /// Run every configured sensor once, in order.
    ///
    /// A failing sensor is recorded in the report and never stops the others.
    pub async fn run_once(&self, config: &PredaiConfig, now: DateTime<Utc>) -> RunReport {
        let mut report = RunReport::default();
        for (i, sensor) in config.sensors.iter().enumerate() {
            let label = sensor
                .name
                .clone()
                .unwrap_or_else(|| format!("sensors[{i}]"));
            match self.run_sensor(sensor, now).await {
                Ok(SensorOutcome::Published { entity_id, .. }) => report.published.push(entity_id),
                Ok(SensorOutcome::Skipped { .. }) => report.skipped.push(label),
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(sensor = %label, error = %error, "sensor pipeline failed");
                    report.failed.push(SensorFailure {
                        sensor: label,
                        error,
                    });
                }
            }
        }
        report
    }
}
