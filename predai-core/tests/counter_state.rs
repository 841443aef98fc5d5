use predai_core::{CounterParams, CounterState};

#[test]
fn first_reading_seeds_without_delta() {
    let mut s = CounterState::new(CounterParams::meter(1.0, 2.0));
    assert_eq!(s.observe(Some(50.0)), Some(50.0));
    assert_eq!(s.total(), 0.0);
    assert_eq!(s.flush(), 0.0);
}

#[test]
fn missing_reading_before_any_value_is_skipped() {
    let mut s = CounterState::new(CounterParams::meter(1.0, 2.0));
    assert_eq!(s.observe(None), None);
    assert_eq!(s.last_value(), None);
}

#[test]
fn missing_reading_repeats_last_value() {
    let mut s = CounterState::new(CounterParams::meter(1.0, 2.0));
    s.observe(Some(4.0));
    s.observe(Some(6.0));
    assert_eq!(s.observe(None), Some(6.0));
    assert_eq!(s.flush(), 2.0);
}

#[test]
fn reset_thresholds_are_strict() {
    // new == reset_low is not a reset, so the drop is clamped to zero
    let mut s = CounterState::new(CounterParams::meter(2.0, 8.0));
    s.observe(Some(12.0));
    s.observe(Some(2.0));
    assert_eq!(s.total(), 0.0);

    // prev == reset_high is not a reset either
    let mut s = CounterState::new(CounterParams::meter(2.0, 8.0));
    s.observe(Some(8.0));
    s.observe(Some(1.0));
    assert_eq!(s.total(), 0.0);

    let mut s = CounterState::new(CounterParams::meter(2.0, 8.0));
    s.observe(Some(8.5));
    s.observe(Some(1.5));
    assert_eq!(s.total(), 1.5);
}

#[test]
fn downward_drift_never_goes_negative() {
    let mut s = CounterState::new(CounterParams::meter(0.0, 0.0));
    s.observe(Some(10.0));
    s.observe(Some(9.0));
    assert_eq!(s.total(), 0.0);
    s.observe(Some(9.5));
    assert_eq!(s.total(), 0.5);
}

#[test]
fn spike_filter_keeps_previous_value() {
    let mut s = CounterState::new(CounterParams::meter(1.0, 2.0).with_max_increment(5.0));
    s.observe(Some(10.0));
    assert_eq!(s.observe(Some(100.0)), Some(10.0));
    assert_eq!(s.last_value(), Some(10.0));
    assert_eq!(s.observe(Some(14.0)), Some(14.0));
    assert_eq!(s.flush(), 4.0);
    assert_eq!(s.total(), 0.0);
}

#[test]
fn instantaneous_flush_returns_last_value() {
    let mut s = CounterState::new(CounterParams::instantaneous());
    s.observe(Some(3.5));
    s.observe(Some(-1.0));
    assert_eq!(s.flush(), -1.0);
    assert_eq!(s.flush(), -1.0);
}
