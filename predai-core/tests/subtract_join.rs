mod helpers;

use std::collections::BTreeMap;

use chrono::Duration;
use predai_core::{Point, left_join, subtract, subtract_all};

use helpers::{t0, values};

fn series(vals: &[f64]) -> Vec<Point> {
    vals.iter()
        .enumerate()
        .map(|(i, v)| Point::new(t0() + Duration::minutes(30 * i as i64), *v))
        .collect()
}

#[test]
fn subtracts_matching_timestamps_and_floors_at_zero() {
    let primary = series(&[10.0, 20.0]);
    let secondary = series(&[3.0, 25.0]);
    let out = subtract(primary.clone(), &secondary, true);
    assert_eq!(values(&out), vec![7.0, 0.0]);

    let out = subtract(primary, &secondary, false);
    assert_eq!(values(&out), vec![7.0, -5.0]);
}

#[test]
fn missing_secondary_subtracts_zero_and_extras_are_ignored() {
    let primary = series(&[10.0, 20.0, 30.0]);
    let secondary = vec![
        Point::new(t0(), 1.0),
        Point::new(t0() + Duration::minutes(15), 100.0),
        Point::new(t0() + Duration::days(1), 100.0),
    ];
    let out = subtract(primary.clone(), &secondary, true);
    assert_eq!(out.len(), primary.len());
    assert_eq!(values(&out), vec![9.0, 20.0, 30.0]);
    let ts: Vec<_> = out.iter().map(|p| p.ts).collect();
    let want: Vec<_> = primary.iter().map(|p| p.ts).collect();
    assert_eq!(ts, want);
}

#[test]
fn subtract_all_applies_in_order() {
    let primary = series(&[10.0, 10.0]);
    let out = subtract_all(primary, &[series(&[4.0, 12.0]), series(&[1.0, 1.0])], true);
    assert_eq!(values(&out), vec![5.0, 0.0]);
}

#[test]
fn left_join_keeps_one_row_per_primary_point() {
    let primary = series(&[1.0, 2.0, 3.0]);
    let mut covs = BTreeMap::new();
    covs.insert("b_temp".to_string(), vec![Point::new(t0() + Duration::minutes(30), 15.0)]);
    covs.insert("a_solar".to_string(), series(&[0.5, 0.6, 0.7, 0.8]));

    let rows = left_join(&primary, &covs);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].regressors, vec![Some(0.5), None]);
    assert_eq!(rows[1].regressors, vec![Some(0.6), Some(15.0)]);
    assert_eq!(rows[2].value, 3.0);
}
