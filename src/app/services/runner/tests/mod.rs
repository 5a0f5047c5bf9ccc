//! Tests for the QC runner and flag summaries


use crate::app::models::ObservationSeries;
use crate::app::services::qartod::{GrossRangeConfig, SpikeConfig};
use crate::config::{QcConfig, VariableConfig};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// `n` hourly timestamps from the start of 2021
pub fn hourly_times(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + TimeDelta::hours(i as i64)).collect()
}

/// Gross range [0, 100] with suspect [0, 40] plus a spike test
pub fn temperature_tests() -> VariableConfig {
    VariableConfig::default()
        .with_gross_range(GrossRangeConfig::from_bounds((0.0, 100.0), Some((0.0, 40.0))).unwrap())
        .with_spike(SpikeConfig::new(10.0, 30.0).unwrap())
}

/// Configuration with a single `temp` variable
pub fn create_test_config() -> QcConfig {
    QcConfig::default().with_variable("temp", temperature_tests())
}

/// Series with one spike and one gap
pub fn create_test_series() -> ObservationSeries {
    ObservationSeries::from_raw(&[5.0, 5.0, 50.0, 5.0, f64::NAN]).with_times(hourly_times(5))
}
