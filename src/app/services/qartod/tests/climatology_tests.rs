//! Tests for the climatology test

use super::*;
use crate::app::models::ValueSpan;
use crate::app::services::climatology::{ClimatologyConfig, MonthDay, Span, TimeWindow};
use crate::app::services::qartod::climatology::climatology_test;

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn doy(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::day_of_year(
        MonthDay::new(start.0, start.1).unwrap(),
        MonthDay::new(end.0, end.1).unwrap(),
    )
}

fn vspan(min: f64, max: f64) -> ValueSpan {
    ValueSpan::new(min, max).unwrap()
}

fn seasonal_config() -> ClimatologyConfig {
    ClimatologyConfig::new()
        .with_span(
            Span::new(doy((12, 1), (2, 28)), vspan(0.0, 10.0))
                .with_fail_span(vspan(-5.0, 20.0))
                .unwrap(),
        )
        .with_span(Span::new(doy((6, 1), (8, 31)), vspan(15.0, 30.0)))
}

#[test]
fn test_climatology_seasonal_flags() {
    let values = series(&[5.0, 15.0, 25.0, 20.0, 5.0, 10.0, f64::NAN]);
    let times = vec![
        at(2021, 1, 15),
        at(2021, 1, 16),
        at(2021, 1, 17),
        at(2021, 7, 1),
        at(2021, 7, 2),
        at(2021, 7, 3),
        at(2021, 7, 4),
    ];

    let flags = climatology_test(&values, &times, None, &seasonal_config()).unwrap();
    assert_codes(&flags, &[1, 3, 4, 1, 3, 3, 9]);
}

#[test]
fn test_climatology_unmatched_is_unknown() {
    let values = series(&[10.0, 1000.0]);
    let times = vec![at(2021, 4, 1), at(2021, 4, 2)];

    let flags = climatology_test(&values, &times, None, &seasonal_config()).unwrap();
    assert_codes(&flags, &[2, 2]);
}

#[test]
fn test_climatology_wraps_year_boundary() {
    let config = ClimatologyConfig::new().with_span(Span::new(doy((12, 1), (2, 1)), vspan(0.0, 10.0)));
    let values = series(&[5.0, 50.0, 5.0]);
    let times = vec![at(2020, 12, 31), at(2021, 1, 1), at(2021, 2, 2)];

    let flags = climatology_test(&values, &times, None, &config).unwrap();
    assert_codes(&flags, &[1, 3, 2]);
}

#[test]
fn test_climatology_first_match_wins() {
    let config = ClimatologyConfig::new()
        .with_span(Span::new(doy((11, 1), (2, 28)), vspan(0.0, 12.0)))
        .with_span(Span::new(doy((1, 1), (1, 31)), vspan(2.0, 8.0)));
    let values = series(&[10.0]);
    let times = vec![at(2021, 1, 10)];

    // January is covered by both spans; the winter span listed first applies
    let flags = climatology_test(&values, &times, None, &config).unwrap();
    assert_codes(&flags, &[1]);
}

#[test]
fn test_climatology_depth_selection() {
    let year = doy((1, 1), (12, 31));
    let config = ClimatologyConfig::new()
        .with_span(Span::new(year, vspan(10.0, 25.0)).with_depth(vspan(0.0, 50.0)))
        .with_span(Span::new(year, vspan(2.0, 10.0)).with_depth(vspan(50.0, 1000.0)));
    let values = series(&[20.0, 20.0, 20.0, 20.0]);
    let times = vec![at(2021, 5, 1); 4];
    let depths = vec![Some(10.0), Some(500.0), Some(2000.0), None];

    let flags = climatology_test(&values, &times, Some(&depths), &config).unwrap();
    assert_codes(&flags, &[1, 3, 2, 2]);
}

#[test]
fn test_climatology_dated_span() {
    let window = TimeWindow::dates(at(2021, 1, 1), at(2021, 2, 1)).unwrap();
    let config = ClimatologyConfig::new().with_span(Span::new(window, vspan(0.0, 5.0)));
    let values = series(&[3.0, 3.0]);
    let times = vec![at(2021, 1, 20), at(2022, 1, 20)];

    let flags = climatology_test(&values, &times, None, &config).unwrap();
    assert_codes(&flags, &[1, 2]);
}

#[test]
fn test_climatology_errors() {
    let values = series(&[1.0, 2.0]);
    let times = vec![at(2021, 1, 1), at(2021, 1, 2)];

    let err = climatology_test(&values, &times, None, &ClimatologyConfig::new()).unwrap_err();
    assert!(err.is_configuration());

    let depths = vec![Some(1.0)];
    let err = climatology_test(&values, &times, Some(&depths), &seasonal_config()).unwrap_err();
    assert!(err.is_shape());

    let backwards = vec![at(2021, 1, 2), at(2021, 1, 1)];
    let err = climatology_test(&values, &backwards, None, &seasonal_config()).unwrap_err();
    assert!(err.is_shape());
}
