use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::Point;
use crate::timeseries::subtract::index_by_ts;

/// One training-table row: the primary value plus each regressor, if present
/// at the same timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    /// Tick timestamp.
    pub ts: DateTime<Utc>,
    /// Primary series value.
    pub value: f64,
    /// Regressor values in the column order of the covariate map.
    pub regressors: Vec<Option<f64>>,
}

/// Left-join named covariate series onto `primary` by exact timestamp.
///
/// The output has exactly one row per `primary` point. Regressor columns
/// follow the key order of `covariates`.
#[must_use]
pub fn left_join(primary: &[Point], covariates: &BTreeMap<String, Vec<Point>>) -> Vec<JoinedRow> {
    let indexes: Vec<BTreeMap<DateTime<Utc>, f64>> =
        covariates.values().map(|s| index_by_ts(s)).collect();
    primary
        .iter()
        .map(|p| JoinedRow {
            ts: p.ts,
            value: p.value,
            regressors: indexes.iter().map(|ix| ix.get(&p.ts).copied()).collect(),
        })
        .collect()
}
