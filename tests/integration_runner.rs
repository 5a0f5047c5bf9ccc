//! Integration tests for end-to-end QC runs from JSON files
//!
//! These tests write a configuration and an observation document to
//! temporary files, run every QARTOD test through the public API and check
//! the flags and the written report.

use qartod_qc::app::services::qartod::TestKind;
use qartod_qc::app::services::runner::{ObservationDocument, QcRunner};
use qartod_qc::cli::args::{Args, Commands};
use qartod_qc::cli::commands;
use qartod_qc::{QartodFlag, QcConfig};
use clap::Parser;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "variables": {
        "sea_surface_height": {
            "gross_range": {"fail_span": [-10, 10], "suspect_span": [-2, 3]},
            "spike": {"suspect_threshold": 0.3, "fail_threshold": 0.9},
            "rate_of_change": {"num_deviations": 3, "deviation": 0.5, "rate_unit_secs": 3600},
            "flat_line": {"suspect_threshold_secs": 7200, "fail_threshold_secs": 10800, "tolerance": 0.001},
            "location": {"bbox": [-80, 20, -60, 45], "range_max": 50000}
        },
        "sea_water_temperature": {
            "attenuated_signal": {"suspect_threshold": 0.05, "fail_threshold": 0.01, "window": {"samples": 3}},
            "climatology": {"spans": [
                {"time": {"day_of_year": {"start": "12-01", "end": "02-28"}}, "suspect_span": [2, 12], "fail_span": [-2, 20]},
                {"time": {"day_of_year": {"start": "03-01", "end": "11-30"}}, "suspect_span": [8, 28]}
            ]}
        }
    },
    "max_concurrent_variables": 2
}"#;

const OBSERVATIONS: &str = r#"{
    "time": [
        "2020-12-31T22:00:00Z", "2020-12-31T23:00:00Z", "2021-01-01T00:00:00Z",
        "2021-01-01T01:00:00Z", "2021-01-01T02:00:00Z", "2021-01-01T03:00:00Z"
    ],
    "lat": [40.0, 40.01, 40.02, 40.03, 40.04, 40.05],
    "lon": [-70.0, -70.0, -70.0, -70.0, -70.0, -59.0],
    "variables": {
        "sea_surface_height": [0.5, 0.5, 2.5, 0.6, 0.6, null],
        "sea_water_temperature": [10.0, 10.0, 10.0, 25.0, 11.0, 11.5],
        "wind_speed": [3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
    }
}"#;

fn write_inputs(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let config_path = dir.path().join("qc.json");
    let input_path = dir.path().join("observations.json");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&input_path, OBSERVATIONS).unwrap();
    (config_path, input_path)
}

/// Run every test type over realistic data through the runner
#[tokio::test]
async fn test_full_run_from_files() {
    let dir = TempDir::new().unwrap();
    let (config_path, input_path) = write_inputs(&dir);

    let config = QcConfig::from_file(&config_path).unwrap();
    let document = ObservationDocument::from_file(&input_path).unwrap();
    let report = QcRunner::new(config).unwrap().run_all(document).await.unwrap();

    assert_eq!(report.variables.len(), 2);
    assert_eq!(report.unconfigured, vec!["wind_speed".to_string()]);
    assert!(report.absent.is_empty());

    let ssh = &report.variables["sea_surface_height"];
    assert_eq!(ssh.results.len(), 5);
    assert_eq!(ssh.results[&TestKind::GrossRange].codes(), vec![1, 1, 1, 1, 1, 9]);
    assert_eq!(ssh.results[&TestKind::Spike].codes(), vec![2, 1, 4, 1, 2, 9]);
    assert_eq!(ssh.results[&TestKind::RateOfChange].codes(), vec![2, 1, 3, 3, 1, 9]);
    assert_eq!(ssh.results[&TestKind::FlatLine].codes(), vec![2, 2, 1, 1, 1, 9]);
    // The last fix leaves the box and jumps more than 900 km
    assert_eq!(ssh.results[&TestKind::Location].codes(), vec![1, 1, 1, 1, 1, 4]);
    assert_eq!(ssh.aggregate.codes(), vec![2, 2, 4, 3, 2, 9]);

    let temp = &report.variables["sea_water_temperature"];
    // Both Dec 31 and Jan 1 fall in the winter span
    assert_eq!(temp.results[&TestKind::Climatology].codes(), vec![1, 1, 1, 4, 1, 1]);
    assert_eq!(temp.results[&TestKind::AttenuatedSignal].codes(), vec![2, 4, 4, 1, 1, 1]);
    assert_eq!(temp.aggregate.codes(), vec![2, 4, 4, 4, 1, 1]);

    assert_eq!(report.totals.total, 12);
    assert_eq!(report.totals.count(QartodFlag::Missing), 1);
}

/// The run command writes a JSON report with numeric flag codes
#[tokio::test]
async fn test_run_command_writes_report() {
    let dir = TempDir::new().unwrap();
    let (config_path, input_path) = write_inputs(&dir);
    let output_path = dir.path().join("report.json");

    let args = Args::try_parse_from([
        "qartod-qc",
        "run",
        "--config",
        config_path.to_str().unwrap(),
        "--input",
        input_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
        "--quiet",
    ])
    .unwrap();
    assert!(matches!(args.command, Some(Commands::Run(_))));

    let report = commands::run(args).await.unwrap().unwrap();
    assert_eq!(report.variables.len(), 2);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    let aggregate = &written["variables"]["sea_surface_height"]["aggregate"];
    assert_eq!(aggregate, &serde_json::json!([2, 2, 4, 3, 2, 9]));
    assert_eq!(
        written["variables"]["sea_water_temperature"]["results"]["climatology"],
        serde_json::json!([1, 1, 1, 4, 1, 1])
    );
    assert_eq!(written["unconfigured"], serde_json::json!(["wind_speed"]));
}

/// Missing input files surface as I/O errors
#[tokio::test]
async fn test_run_command_missing_input() {
    let dir = TempDir::new().unwrap();
    let (config_path, _) = write_inputs(&dir);

    let args = Args::try_parse_from([
        "qartod-qc",
        "run",
        "-c",
        config_path.to_str().unwrap(),
        "-i",
        dir.path().join("missing.json").to_str().unwrap(),
        "-q",
    ])
    .unwrap();

    let err = commands::run(args).await.unwrap_err();
    assert!(matches!(err, qartod_qc::Error::Io { .. }));
}
