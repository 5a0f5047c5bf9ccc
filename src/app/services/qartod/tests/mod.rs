//! Tests for the QARTOD test functions
//!
//! Shared fixtures build regularly sampled series; each test module covers
//! one QARTOD test plus the aggregation and rolling statistics helpers.

pub mod climatology_tests;
pub mod gross_range_tests;

use crate::app::models::{FlagSeries, QartodFlag, values_from_raw};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Start of every fixture series
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

/// `n` timestamps `step_secs` apart starting at [`epoch`]
pub fn times_every(n: usize, step_secs: i64) -> Vec<DateTime<Utc>> {
    (0..n)
        .map(|i| epoch() + TimeDelta::seconds(step_secs * i as i64))
        .collect()
}

/// `n` hourly timestamps
pub fn hourly_times(n: usize) -> Vec<DateTime<Utc>> {
    times_every(n, 3600)
}

/// Value series with NaN marking missing samples
pub fn series(raw: &[f64]) -> Vec<Option<f64>> {
    values_from_raw(raw)
}

/// Flag series from raw QARTOD codes
pub fn flags_from_codes(codes: &[u8]) -> FlagSeries {
    codes
        .iter()
        .map(|&c| QartodFlag::try_from(c).unwrap())
        .collect()
}

/// Assert the flag codes of a series
pub fn assert_codes(flags: &FlagSeries, expected: &[u8]) {
    assert_eq!(flags.codes(), expected.to_vec(), "flags: {:?}", flags);
}
