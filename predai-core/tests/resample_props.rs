mod helpers;

use chrono::{Duration, Timelike};
use predai_core::RawSample;
use predai_core::timeseries::resample::{CounterParams, ResampleOptions, resample};
use proptest::prelude::*;

use helpers::{raw_every, t0, values};

fn arb_period() -> impl Strategy<Value = i64> {
    prop::sample::select(vec![5i64, 10, 15, 30, 60])
}

proptest! {
    #[test]
    fn instantaneous_ticks_equal_tick_aligned_readings(
        period in arb_period(),
        vals in prop::collection::vec(-1_000.0f64..1_000.0, 1..60),
    ) {
        let raw = raw_every(t0(), period, &vals);
        let end = t0() + Duration::minutes(period * (vals.len() as i64 - 1));
        let out = resample(&raw, t0(), end, ResampleOptions::new(period, CounterParams::instantaneous()));

        prop_assert_eq!(out.points.len(), vals.len());
        for (i, p) in out.points.iter().enumerate() {
            prop_assert_eq!(p.ts, t0() + Duration::minutes(period * i as i64));
            prop_assert_eq!(p.value, vals[i]);
        }
        prop_assert_eq!(out.carry, *vals.last().unwrap());
    }

    #[test]
    fn meter_deltas_telescope_to_net_increase(
        period in arb_period(),
        start in 0.0f64..10_000.0,
        steps in prop::collection::vec(0u32..500, 1..80),
    ) {
        // Monotone non-decreasing readings on two-decimal steps never trigger a reset.
        let mut vals = vec![start];
        for s in &steps {
            let next = vals.last().unwrap() + f64::from(*s) / 100.0;
            vals.push(next);
        }
        let raw = raw_every(t0(), period, &vals);
        let end = t0() + Duration::minutes(period * (vals.len() as i64 - 1));
        let out = resample(&raw, t0(), end, ResampleOptions::new(period, CounterParams::meter(1.0, 2.0)));

        prop_assert_eq!(out.points.len(), vals.len());
        let sum: f64 = out.points.iter().map(|p| p.value).sum();
        let net = vals.last().unwrap() - vals[0];
        prop_assert!((sum - net).abs() < 1e-6, "sum {} net {}", sum, net);
        prop_assert!(out.points.iter().all(|p| p.value >= 0.0));
    }

    #[test]
    fn ticks_are_uniform_hour_aligned_and_bounded(
        period in arb_period(),
        offset_min in 0i64..59,
        vals in prop::collection::vec(0.0f64..100.0, 1..100),
    ) {
        let start = t0() + Duration::minutes(offset_min);
        let raw = raw_every(start, 7, &vals);
        let end = start + Duration::minutes(7 * (vals.len() as i64 - 1));
        let out = resample(&raw, start, end, ResampleOptions::new(period, CounterParams::instantaneous()));

        prop_assert!(!out.points.is_empty());
        prop_assert_eq!(out.points[0].ts, t0());
        prop_assert_eq!(out.points[0].ts.minute(), 0);
        for w in out.points.windows(2) {
            prop_assert_eq!(w[1].ts - w[0].ts, Duration::minutes(period));
        }
        prop_assert!(out.points.iter().all(|p| p.ts <= end));
    }
}

#[test]
fn empty_input_yields_empty_series() {
    let out = resample(&[], t0(), t0() + Duration::hours(1), ResampleOptions::new(30, CounterParams::default()));
    assert!(out.points.is_empty());
    assert_eq!(out.carry, 0.0);
}

#[test]
fn end_before_start_or_bad_period_yields_empty_series() {
    let raw = raw_every(t0(), 30, &[1.0, 2.0]);
    let opts = ResampleOptions::new(30, CounterParams::default());
    assert!(resample(&raw, t0(), t0() - Duration::hours(1), opts).points.is_empty());
    let bad = ResampleOptions::new(0, CounterParams::default());
    assert!(resample(&raw, t0(), t0() + Duration::hours(1), bad).points.is_empty());
}

#[test]
fn one_day_of_five_minute_samples_gives_48_half_hour_rows() {
    let vals: Vec<f64> = (0..288_i32).map(|i| 100.0 + f64::from(i) * 0.1).collect();
    let raw = raw_every(t0(), 5, &vals);
    let end = t0() + Duration::minutes(5 * 287);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, CounterParams::meter(1.0, 2.0)));

    assert_eq!(out.points.len(), 48);
    assert_eq!(out.points[0].ts, t0());
    assert_eq!(out.points[47].ts, t0() + Duration::minutes(30 * 47));
    assert_eq!(out.points[0].value, 0.0);
    // six 0.1 increments per half hour
    for p in &out.points[1..] {
        assert!((p.value - 0.6).abs() < 1e-9, "{p:?}");
    }
    // the walk stops at the 23:30 tick, which is sample 282
    assert!((out.carry - vals[282]).abs() < 1e-9);
}

#[test]
fn samples_after_the_last_tick_are_not_read() {
    let mut raw = raw_every(t0(), 30, &[1.0, 2.0, 3.0]);
    raw.push(RawSample::at(t0() + Duration::minutes(70), 9.0));
    let end = t0() + Duration::minutes(70);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, CounterParams::default()));
    assert_eq!(values(&out.points), vec![1.0, 2.0, 3.0]);
    assert_eq!(out.carry, 3.0);
}

#[test]
fn counter_reset_contributes_the_new_reading() {
    let raw = raw_every(t0(), 30, &[10.0, 12.0, 1.0, 3.0]);
    let end = t0() + Duration::minutes(90);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, CounterParams::meter(2.0, 8.0)));
    assert_eq!(values(&out.points), vec![0.0, 2.0, 1.0, 2.0]);
    assert_eq!(out.carry, 3.0);
}

#[test]
fn spike_is_filtered_out() {
    let raw = raw_every(t0(), 30, &[10.0, 100.0, 11.0]);
    let end = t0() + Duration::minutes(60);
    let params = CounterParams::meter(1.0, 2.0).with_max_increment(5.0);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, params));
    assert_eq!(values(&out.points), vec![0.0, 0.0, 1.0]);
    assert_eq!(out.carry, 11.0);
}

#[test]
fn unparseable_states_carry_the_last_value() {
    let mut raw = raw_every(t0(), 30, &[0.0, 5.0, 0.0, 7.0]);
    raw[0].state = "unavailable".into();
    raw[2].state = "unknown".into();
    let end = t0() + Duration::minutes(90);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, CounterParams::instantaneous()));
    assert_eq!(values(&out.points), vec![5.0, 5.0, 5.0, 7.0]);
}

#[test]
fn all_non_numeric_yields_empty_series() {
    let mut raw = raw_every(t0(), 30, &[0.0, 0.0]);
    raw[0].state = "unavailable".into();
    raw[1].state = "nan".into();
    let out = resample(&raw, t0(), t0() + Duration::hours(1), ResampleOptions::new(30, CounterParams::instantaneous()));
    assert!(out.points.is_empty());
    assert_eq!(out.carry, 0.0);
}

#[test]
fn a_gap_is_filled_by_the_sample_that_closes_it() {
    let mut raw = raw_every(t0(), 30, &[1.0]);
    raw.extend(raw_every(t0() + Duration::minutes(90), 30, &[4.0]));
    let end = t0() + Duration::minutes(90);
    let out = resample(&raw, t0(), end, ResampleOptions::new(30, CounterParams::instantaneous()));
    assert_eq!(values(&out.points), vec![1.0, 4.0, 4.0, 4.0]);
}
