//! Data models for QARTOD quality control
//!
//! This module contains the core data structures shared by every test: the
//! QARTOD flag and its severity order, the immutable flag series a test
//! produces, inclusive value spans, and the observation series the tests read.

use crate::constants::{self, qartod_flags};
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// =============================================================================
// QARTOD Flag
// =============================================================================

/// QARTOD quality flag
///
/// `Good < Unknown < Suspect < Fail` is a total severity order. `Missing` sits
/// outside it: it marks an absent source value, not a quality judgment, so it
/// compares as `None` against every other flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum QartodFlag {
    /// Data passed the test
    Good = qartod_flags::GOOD,

    /// Test could not judge the data (boundary, short history, no climatology)
    Unknown = qartod_flags::UNKNOWN,

    /// Data is of questionable quality
    Suspect = qartod_flags::SUSPECT,

    /// Data failed the test
    Fail = qartod_flags::FAIL,

    /// Source value is absent
    Missing = qartod_flags::MISSING,
}

impl QartodFlag {
    /// Numeric interchange code (1, 2, 3, 4 or 9)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Position in the severity order used for aggregation.
    ///
    /// `Missing` ranks with `Unknown`.
    pub fn severity(self) -> u8 {
        match self {
            QartodFlag::Good => 0,
            QartodFlag::Unknown | QartodFlag::Missing => 1,
            QartodFlag::Suspect => 2,
            QartodFlag::Fail => 3,
        }
    }

    /// The more severe of two flags under the aggregation order
    pub fn worst(self, other: QartodFlag) -> QartodFlag {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// True for the out-of-band missing marker
    pub fn is_missing(self) -> bool {
        self == QartodFlag::Missing
    }

    /// Check if this flag represents data fit for use
    pub fn is_usable(self, include_suspect: bool) -> bool {
        constants::is_usable_flag(self.code(), include_suspect)
    }

    /// Get human-readable description of this flag
    pub fn description(self) -> &'static str {
        constants::flag_description(self.code())
    }

    /// Get all possible flag values
    pub fn all_values() -> [QartodFlag; 5] {
        [
            QartodFlag::Good,
            QartodFlag::Unknown,
            QartodFlag::Suspect,
            QartodFlag::Fail,
            QartodFlag::Missing,
        ]
    }
}

impl PartialOrd for QartodFlag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (QartodFlag::Missing, QartodFlag::Missing) => Some(Ordering::Equal),
            (QartodFlag::Missing, _) | (_, QartodFlag::Missing) => None,
            _ => Some(self.severity().cmp(&other.severity())),
        }
    }
}

impl FromStr for QartodFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" | "GOOD" => Ok(QartodFlag::Good),
            "2" | "UNKNOWN" => Ok(QartodFlag::Unknown),
            "3" | "SUSPECT" => Ok(QartodFlag::Suspect),
            "4" | "FAIL" => Ok(QartodFlag::Fail),
            "9" | "MISSING" => Ok(QartodFlag::Missing),
            _ => Err(Error::configuration(format!(
                "Invalid QARTOD flag '{}': must be 1, 2, 3, 4 or 9",
                s
            ))),
        }
    }
}

impl TryFrom<u8> for QartodFlag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            qartod_flags::GOOD => Ok(QartodFlag::Good),
            qartod_flags::UNKNOWN => Ok(QartodFlag::Unknown),
            qartod_flags::SUSPECT => Ok(QartodFlag::Suspect),
            qartod_flags::FAIL => Ok(QartodFlag::Fail),
            qartod_flags::MISSING => Ok(QartodFlag::Missing),
            _ => Err(Error::configuration(format!(
                "Invalid QARTOD flag {}: must be 1, 2, 3, 4 or 9",
                value
            ))),
        }
    }
}

impl From<QartodFlag> for u8 {
    fn from(flag: QartodFlag) -> Self {
        flag as u8
    }
}

impl std::fmt::Display for QartodFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QartodFlag::Good => "GOOD",
            QartodFlag::Unknown => "UNKNOWN",
            QartodFlag::Suspect => "SUSPECT",
            QartodFlag::Fail => "FAIL",
            QartodFlag::Missing => "MISSING",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Flag Series
// =============================================================================

/// One flag per input index, produced by a test or by aggregation.
///
/// There are no mutating accessors; a series is fixed once produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSeries(Vec<QartodFlag>);

impl FlagSeries {
    /// Number of flags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the series holds no flags
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flag at `index`
    pub fn get(&self, index: usize) -> Option<QartodFlag> {
        self.0.get(index).copied()
    }

    /// Borrow the flags
    pub fn as_slice(&self) -> &[QartodFlag] {
        &self.0
    }

    /// Iterate over the flags
    pub fn iter(&self) -> impl Iterator<Item = QartodFlag> + '_ {
        self.0.iter().copied()
    }

    /// Numeric interchange codes
    pub fn codes(&self) -> Vec<u8> {
        self.0.iter().map(|flag| flag.code()).collect()
    }

    /// Number of occurrences of `flag`
    pub fn count(&self, flag: QartodFlag) -> usize {
        self.0.iter().filter(|&&f| f == flag).count()
    }

    /// Consume the series, returning the flags
    pub fn into_inner(self) -> Vec<QartodFlag> {
        self.0
    }
}

impl From<Vec<QartodFlag>> for FlagSeries {
    fn from(flags: Vec<QartodFlag>) -> Self {
        Self(flags)
    }
}

impl FromIterator<QartodFlag> for FlagSeries {
    fn from_iter<I: IntoIterator<Item = QartodFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for FlagSeries {
    type Output = QartodFlag;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

// =============================================================================
// Value Span
// =============================================================================

/// Inclusive value interval `[min, max]`
///
/// Bounds may be given in either order and are sorted on construction.
/// Infinite bounds are allowed (one-sided spans); NaN bounds are not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct ValueSpan {
    min: f64,
    max: f64,
}

impl ValueSpan {
    /// Create a span, sorting the bounds
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if a.is_nan() || b.is_nan() {
            return Err(Error::configuration(format!(
                "Span bounds must not be NaN, got ({}, {})",
                a, b
            )));
        }
        Ok(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Check if a value lies inside the span (bounds included)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check if `other` lies entirely inside this span
    pub fn contains_span(&self, other: &ValueSpan) -> bool {
        other.min >= self.min && other.max <= self.max
    }
}

impl TryFrom<[f64; 2]> for ValueSpan {
    type Error = Error;

    fn try_from(bounds: [f64; 2]) -> Result<Self> {
        ValueSpan::new(bounds[0], bounds[1])
    }
}

impl From<ValueSpan> for [f64; 2] {
    fn from(span: ValueSpan) -> Self {
        [span.min, span.max]
    }
}

impl std::fmt::Display for ValueSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// =============================================================================
// Observation Series
// =============================================================================

/// Map raw floats to explicit optional values, treating NaN as missing
pub fn values_from_raw(raw: &[f64]) -> Vec<Option<f64>> {
    raw.iter()
        .map(|&v| if v.is_nan() { None } else { Some(v) })
        .collect()
}

/// An ordered series of samples with optional index-aligned coordinates
///
/// Values are `None` where the observation is absent. Every supplied
/// parallel array must have the same length as `values`, and timestamps
/// must be non-decreasing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationSeries {
    /// Observed values
    pub values: Vec<Option<f64>>,

    /// Observation timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<DateTime<Utc>>>,

    /// Latitudes in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Vec<Option<f64>>>,

    /// Longitudes in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<Vec<Option<f64>>>,

    /// Depths, positive down
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<Vec<Option<f64>>>,
}

impl ObservationSeries {
    /// Create a series from values only
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Create a series from raw floats, NaN meaning missing
    pub fn from_raw(raw: &[f64]) -> Self {
        Self::new(values_from_raw(raw))
    }

    /// Attach timestamps
    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> Self {
        self.times = Some(times);
        self
    }

    /// Attach latitude/longitude fixes
    pub fn with_locations(mut self, lat: Vec<Option<f64>>, lon: Vec<Option<f64>>) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Attach depths
    pub fn with_depths(mut self, depth: Vec<Option<f64>>) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Timestamps, or a shape error naming the test that needs them
    pub fn require_times(&self, test: &str) -> Result<&[DateTime<Utc>]> {
        self.times
            .as_deref()
            .ok_or_else(|| Error::shape(format!("{test} requires timestamps")))
    }

    /// Validate the series for consistent lengths and ordered timestamps
    pub fn validate(&self) -> Result<()> {
        let n = self.values.len();
        if let Some(times) = &self.times {
            check_len("times", n, times.len())?;
            check_times_ordered(times)?;
        }
        if let Some(lat) = &self.lat {
            check_len("lat", n, lat.len())?;
        }
        if let Some(lon) = &self.lon {
            check_len("lon", n, lon.len())?;
        }
        if self.lat.is_some() != self.lon.is_some() {
            return Err(Error::shape(
                "lat and lon must be provided as a pair".to_string(),
            ));
        }
        if let Some(depth) = &self.depth {
            check_len("depth", n, depth.len())?;
        }
        Ok(())
    }
}

/// Reject a parallel array whose length differs from the value series
pub(crate) fn check_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::length_mismatch(what, expected, found));
    }
    Ok(())
}

/// Whole seconds as a time delta, rejecting values chrono cannot represent
pub(crate) fn delta_from_secs(secs: i64) -> Result<TimeDelta> {
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| Error::configuration(format!("{secs}s is out of range for a duration")))
}

/// Reject timestamps that go backwards (ties are allowed)
pub(crate) fn check_times_ordered(times: &[DateTime<Utc>]) -> Result<()> {
    if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
        return Err(Error::shape(format!(
            "timestamps must be non-decreasing: {} at index {} follows {}",
            times[i + 1],
            i + 1,
            times[i]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::hours(i as i64))
            .collect()
    }

    #[test]
    fn test_flag_codes_round_trip() {
        for flag in QartodFlag::all_values() {
            assert_eq!(QartodFlag::try_from(flag.code()).unwrap(), flag);
        }
        assert!(QartodFlag::try_from(0).is_err());
        assert!(QartodFlag::try_from(5).is_err());
    }

    #[test]
    fn test_flag_severity_order() {
        assert!(QartodFlag::Good < QartodFlag::Unknown);
        assert!(QartodFlag::Unknown < QartodFlag::Suspect);
        assert!(QartodFlag::Suspect < QartodFlag::Fail);
        assert!(QartodFlag::Good < QartodFlag::Fail);
    }

    #[test]
    fn test_missing_is_not_comparable() {
        assert_eq!(QartodFlag::Missing.partial_cmp(&QartodFlag::Good), None);
        assert_eq!(QartodFlag::Fail.partial_cmp(&QartodFlag::Missing), None);
        assert_eq!(
            QartodFlag::Missing.partial_cmp(&QartodFlag::Missing),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_flag_worst() {
        assert_eq!(
            QartodFlag::Good.worst(QartodFlag::Suspect),
            QartodFlag::Suspect
        );
        assert_eq!(QartodFlag::Fail.worst(QartodFlag::Suspect), QartodFlag::Fail);
        assert_eq!(
            QartodFlag::Good.worst(QartodFlag::Missing),
            QartodFlag::Missing
        );
        assert_eq!(
            QartodFlag::Unknown.worst(QartodFlag::Missing),
            QartodFlag::Unknown
        );
    }

    #[test]
    fn test_flag_from_str() {
        assert_eq!("1".parse::<QartodFlag>().unwrap(), QartodFlag::Good);
        assert_eq!("suspect".parse::<QartodFlag>().unwrap(), QartodFlag::Suspect);
        assert_eq!(" 9 ".parse::<QartodFlag>().unwrap(), QartodFlag::Missing);
        assert!("bad".parse::<QartodFlag>().is_err());
    }

    #[test]
    fn test_flag_serializes_as_code() {
        let json = serde_json::to_string(&QartodFlag::Fail).unwrap();
        assert_eq!(json, "4");
        let flag: QartodFlag = serde_json::from_str("9").unwrap();
        assert_eq!(flag, QartodFlag::Missing);
        assert!(serde_json::from_str::<QartodFlag>("7").is_err());
    }

    #[test]
    fn test_flag_series_accessors() {
        let series = FlagSeries::from(vec![
            QartodFlag::Good,
            QartodFlag::Suspect,
            QartodFlag::Good,
            QartodFlag::Missing,
        ]);
        assert_eq!(series.len(), 4);
        assert_eq!(series.codes(), vec![1, 3, 1, 9]);
        assert_eq!(series.count(QartodFlag::Good), 2);
        assert_eq!(series[1], QartodFlag::Suspect);
        assert_eq!(series.get(4), None);
        assert_eq!(serde_json::to_string(&series).unwrap(), "[1,3,1,9]");
    }

    #[test]
    fn test_value_span_sorts_bounds() {
        let span = ValueSpan::new(10.0, -2.0).unwrap();
        assert_eq!(span.min(), -2.0);
        assert_eq!(span.max(), 10.0);
        assert!(span.contains(-2.0));
        assert!(span.contains(10.0));
        assert!(!span.contains(10.000001));
        assert!(!span.contains(f64::INFINITY));
    }

    #[test]
    fn test_value_span_rejects_nan() {
        assert!(ValueSpan::new(f64::NAN, 1.0).unwrap_err().is_configuration());
    }

    #[test]
    fn test_value_span_containment() {
        let outer = ValueSpan::new(0.0, 10.0).unwrap();
        assert!(outer.contains_span(&ValueSpan::new(1.0, 9.0).unwrap()));
        assert!(outer.contains_span(&outer));
        assert!(!outer.contains_span(&ValueSpan::new(-1.0, 9.0).unwrap()));
    }

    #[test]
    fn test_values_from_raw() {
        let values = values_from_raw(&[1.0, f64::NAN, f64::INFINITY]);
        assert_eq!(values, vec![Some(1.0), None, Some(f64::INFINITY)]);
    }

    #[test]
    fn test_series_validate_lengths() {
        let series = ObservationSeries::from_raw(&[1.0, 2.0, 3.0]).with_times(hourly(2));
        assert!(series.validate().unwrap_err().is_shape());

        let series = ObservationSeries::from_raw(&[1.0, 2.0]).with_times(hourly(2));
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_series_validate_time_order() {
        let mut times = hourly(3);
        times.swap(1, 2);
        let series = ObservationSeries::from_raw(&[1.0, 2.0, 3.0]).with_times(times);
        assert!(series.validate().unwrap_err().is_shape());

        let mut times = hourly(3);
        times[2] = times[1];
        let series = ObservationSeries::from_raw(&[1.0, 2.0, 3.0]).with_times(times);
        assert!(series.validate().is_ok(), "ties are permitted");
    }

    #[test]
    fn test_series_requires_paired_locations() {
        let mut series = ObservationSeries::from_raw(&[1.0]);
        series.lat = Some(vec![Some(10.0)]);
        assert!(series.validate().unwrap_err().is_shape());
    }

    #[test]
    fn test_series_deserializes_nulls_as_missing() {
        let series: ObservationSeries =
            serde_json::from_str(r#"{"values": [1.5, null, 2.0]}"#).unwrap();
        assert_eq!(series.values, vec![Some(1.5), None, Some(2.0)]);
        assert_eq!(series.missing_count(), 1);
        assert!(series.require_times("flat line").is_err());
    }
}
