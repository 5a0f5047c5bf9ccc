//! Tests for ordered span lookup

use super::*;
use crate::app::services::climatology::ClimatologyConfig;

#[test]
fn test_config_new_is_empty() {
    let config = ClimatologyConfig::new();

    assert!(config.is_empty());
    assert_eq!(config.len(), 0);
    assert!(config.find(&date(2021, 1, 1), None).is_none());
    assert!(config.validate().unwrap_err().is_configuration());
}

#[test]
fn test_config_first_match_wins() {
    let mut config = ClimatologyConfig::new();
    config.add(simple_span(doy((11, 1), (2, 28)), 0.0, 12.0));
    config.add(simple_span(doy((1, 1), (1, 31)), 2.0, 8.0));

    let january = config.find(&date(2021, 1, 15), None).unwrap();
    assert_eq!(january.suspect_span().max(), 12.0);

    let march = config.find(&date(2021, 3, 15), None);
    assert!(march.is_none());
}

#[test]
fn test_config_insertion_order_decides() {
    let config = ClimatologyConfig::new()
        .with_span(simple_span(doy((1, 1), (1, 31)), 2.0, 8.0))
        .with_span(simple_span(doy((11, 1), (2, 28)), 0.0, 12.0));

    assert_eq!(config.find(&date(2021, 1, 15), None).unwrap().suspect_span().max(), 8.0);
    assert_eq!(config.find(&date(2021, 2, 15), None).unwrap().suspect_span().max(), 12.0);
}

#[test]
fn test_config_depth_layers() {
    let year = doy((1, 1), (12, 31));
    let config: ClimatologyConfig = vec![
        simple_span(year, 10.0, 25.0).with_depth(span(0.0, 50.0)),
        simple_span(year, 2.0, 10.0).with_depth(span(50.0, 1000.0)),
        simple_span(year, 0.0, 30.0),
    ]
    .into_iter()
    .collect();

    let t = date(2021, 6, 1);
    assert_eq!(config.find(&t, Some(10.0)).unwrap().suspect_span().max(), 25.0);
    // Shared boundary belongs to the earlier span
    assert_eq!(config.find(&t, Some(50.0)).unwrap().suspect_span().max(), 25.0);
    assert_eq!(config.find(&t, Some(200.0)).unwrap().suspect_span().max(), 10.0);
    assert_eq!(config.find(&t, Some(5000.0)).unwrap().suspect_span().max(), 30.0);
    assert_eq!(config.find(&t, None).unwrap().suspect_span().max(), 30.0);
}

#[test]
fn test_config_from_json() {
    let config: ClimatologyConfig = serde_json::from_str(
        r#"{
            "spans": [
                {"time": {"day_of_year": {"start": "12-01", "end": "02-28"}}, "suspect_span": [0, 10]},
                {"time": {"day_of_year": {"start": "03-01", "end": "11-30"}}, "suspect_span": [5, 25], "fail_span": [-5, 40]}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.len(), 2);
    assert!(config.validate().is_ok());
    assert_eq!(config.spans()[1].fail_span().map(|s| s.max()), Some(40.0));
}
