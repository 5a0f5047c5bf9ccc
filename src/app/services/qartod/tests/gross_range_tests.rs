//! Tests for the gross range test

use super::*;
use crate::app::models::ValueSpan;
use crate::app::services::qartod::gross_range::{GrossRangeConfig, gross_range_test};

fn config() -> GrossRangeConfig {
    GrossRangeConfig::from_bounds((0.0, 10.0), Some((2.0, 8.0))).unwrap()
}

#[test]
fn test_gross_range_flags() {
    let values = series(&[5.0, 9.0, 11.0, -1.0, f64::NAN, 2.0, 8.0, 10.0, 0.0]);
    let flags = gross_range_test(&values, &config());

    assert_codes(&flags, &[1, 3, 4, 4, 9, 1, 1, 3, 3]);
}

#[test]
fn test_gross_range_infinite_values_fail() {
    let values = vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), None];
    let flags = gross_range_test(&values, &config());

    assert_codes(&flags, &[4, 4, 9]);
}

#[test]
fn test_gross_range_without_suspect_span() {
    let config = GrossRangeConfig::from_bounds((0.0, 10.0), None).unwrap();
    let values = series(&[0.0, 9.9, 10.1]);

    assert_codes(&gross_range_test(&values, &config), &[1, 1, 4]);
}

#[test]
fn test_gross_range_bounds_are_sorted() {
    let config = GrossRangeConfig::from_bounds((10.0, 0.0), None).unwrap();
    assert_eq!(config.fail_span().min(), 0.0);
    assert_eq!(config.fail_span().max(), 10.0);
}

#[test]
fn test_gross_range_rejects_suspect_outside_fail() {
    let result = GrossRangeConfig::from_bounds((0.0, 10.0), Some((-1.0, 8.0)));
    assert!(result.unwrap_err().is_configuration());

    let fail = ValueSpan::new(0.0, 10.0).unwrap();
    let suspect = ValueSpan::new(2.0, 12.0).unwrap();
    assert!(GrossRangeConfig::new(fail, Some(suspect)).is_err());
}

#[test]
fn test_gross_range_empty_input() {
    let flags = gross_range_test(&[], &config());
    assert!(flags.is_empty());
}

#[test]
fn test_gross_range_is_idempotent() {
    let values = series(&[5.0, 9.0, 11.0, f64::NAN]);
    let config = config();

    assert_eq!(
        gross_range_test(&values, &config),
        gross_range_test(&values, &config)
    );
}

#[test]
fn test_gross_range_config_from_json() {
    let config: GrossRangeConfig =
        serde_json::from_str(r#"{"fail_span": [0, 10], "suspect_span": [2, 8]}"#).unwrap();
    assert_eq!(config, self::config());

    let invalid = serde_json::from_str::<GrossRangeConfig>(
        r#"{"fail_span": [0, 10], "suspect_span": [2, 18]}"#,
    );
    assert!(invalid.is_err());
}
