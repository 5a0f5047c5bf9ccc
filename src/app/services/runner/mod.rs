//! Configuration-driven QC runs over whole observation documents
//!
//! The runner binds a validated [`QcConfig`] to observation data: for every
//! configured variable it runs the configured QARTOD tests, aggregates their
//! flags and summarises the result. Variables are independent, so
//! [`QcRunner::run_all`] evaluates them concurrently on blocking worker
//! tasks, bounded by `max_concurrent_variables`.
//!
//! # Example Usage
//!
//! ```rust
//! use qartod_qc::app::services::runner::{ObservationDocument, QcRunner};
//! use qartod_qc::config::QcConfig;
//!
//! # async fn example() -> qartod_qc::Result<()> {
//! let config = QcConfig::from_json_str(
//!     r#"{"variables": {"temp": {"gross_range": {"fail_span": [-5, 40]}}}}"#,
//! )?;
//! let document = ObservationDocument::from_json_str(
//!     r#"{"variables": {"temp": [12.0, null, 55.0]}}"#,
//! )?;
//!
//! let runner = QcRunner::new(config)?;
//! let report = runner.run_all(document).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod summary;

#[cfg(test)]
pub mod tests;

pub use summary::FlagSummary;

use crate::app::models::{FlagSeries, ObservationSeries};
use crate::app::services::qartod::{
    TestKind, aggregate, attenuated_signal_test, climatology_test, flat_line_test,
    gross_range_test, location_test, rate_of_change_test, spike_test,
};
use crate::config::{QcConfig, VariableConfig};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, warn};

/// Observations for several variables sharing one time and position axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<Vec<Option<f64>>>,
    /// Values per variable, `null` marking a missing observation
    pub variables: BTreeMap<String, Vec<Option<f64>>>,
}

impl ObservationDocument {
    /// Parse a JSON observation document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::json("Failed to parse observations", e))
    }

    /// Load a JSON observation document
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read observations {}", path.display()), e)
        })?;
        Self::from_json_str(&contents)
    }

    /// Add a variable's values
    pub fn with_variable(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.variables.insert(name.into(), values);
        self
    }

    /// Assemble the series of one variable with the shared coordinates
    pub fn series(&self, name: &str) -> Option<ObservationSeries> {
        let values = self.variables.get(name)?;
        Some(ObservationSeries {
            values: values.clone(),
            times: self.time.clone(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            depth: self.depth.clone(),
        })
    }
}

/// Flags produced for one variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableReport {
    pub name: String,
    /// Flags of each test that ran
    pub results: BTreeMap<TestKind, FlagSeries>,
    /// Worst-case combination of `results`
    pub aggregate: FlagSeries,
    pub summary: FlagSummary,
}

/// Outcome of a whole-document run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub variables: BTreeMap<String, VariableReport>,
    /// Document variables with no test configuration
    pub unconfigured: Vec<String>,
    /// Configured variables the document does not contain
    pub absent: Vec<String>,
    /// Aggregate flag counts across all variables
    pub totals: FlagSummary,
}

impl RunReport {
    /// Get summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} variables checked, {} unconfigured, {} absent | {}",
            self.variables.len(),
            self.unconfigured.len(),
            self.absent.len(),
            self.totals.summary()
        )
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| {
            Error::io(format!("Failed to create report {}", path.display()), e)
        })?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .map_err(|e| Error::json(format!("Failed to write report {}", path.display()), e))
    }
}

/// Runs configured QARTOD tests over observation data
#[derive(Debug, Clone)]
pub struct QcRunner {
    config: Arc<QcConfig>,
}

impl QcRunner {
    /// Create a runner, validating the configuration
    pub fn new(config: QcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    /// Run the tests configured for `name` over a single series
    pub fn run_variable(&self, name: &str, series: &ObservationSeries) -> Result<VariableReport> {
        let config = self.config.variable(name).ok_or_else(|| {
            Error::configuration(format!("No tests configured for variable '{}'", name))
        })?;
        evaluate_variable(name, config, series)
    }

    /// Run every configured variable present in `document`.
    ///
    /// Fails as a whole if any variable fails; no partial report is returned.
    pub async fn run_all(&self, document: ObservationDocument) -> Result<RunReport> {
        let mut report = RunReport::default();

        let mut jobs = Vec::new();
        for name in document.variables.keys() {
            match document.series(name) {
                Some(series) if self.config.variable(name).is_some() => {
                    jobs.push((name.clone(), series))
                }
                _ => {
                    warn!("No QC configuration for variable '{}', skipping", name);
                    report.unconfigured.push(name.clone());
                }
            }
        }
        for name in self.config.variables.keys() {
            if !document.variables.contains_key(name) {
                warn!("Configured variable '{}' not found in observations", name);
                report.absent.push(name.clone());
            }
        }

        info!(
            "Running QC on {} variables with up to {} workers",
            jobs.len(),
            self.config.max_concurrent_variables
        );

        let results: Vec<Result<VariableReport>> = stream::iter(jobs)
            .map(|(name, series)| {
                let config = Arc::clone(&self.config);
                async move {
                    let task_name = name.clone();
                    let handle = task::spawn_blocking(move || {
                        let variable = config.variable(&task_name).ok_or_else(|| {
                            Error::configuration(format!(
                                "No tests configured for variable '{}'",
                                task_name
                            ))
                        })?;
                        evaluate_variable(&task_name, variable, &series)
                    });
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(Error::task(format!(
                            "QC worker for '{}' failed: {}",
                            name, e
                        ))),
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_variables)
            .collect()
            .await;

        for result in results {
            let variable = result?;
            report.totals.merge(&variable.summary);
            report.variables.insert(variable.name.clone(), variable);
        }

        info!("{}", report.summary());
        Ok(report)
    }
}

/// Run one test over a series
fn run_test(kind: TestKind, config: &VariableConfig, series: &ObservationSeries) -> Result<FlagSeries> {
    let values = &series.values;
    let missing_section =
        || Error::configuration(format!("Test {} has no configuration section", kind));

    match kind {
        TestKind::GrossRange => {
            let c = config.gross_range.as_ref().ok_or_else(missing_section)?;
            Ok(gross_range_test(values, c))
        }
        TestKind::Spike => {
            let c = config.spike.as_ref().ok_or_else(missing_section)?;
            Ok(spike_test(values, c))
        }
        TestKind::RateOfChange => {
            let c = config.rate_of_change.as_ref().ok_or_else(missing_section)?;
            rate_of_change_test(values, series.require_times("rate of change test")?, c)
        }
        TestKind::FlatLine => {
            let c = config.flat_line.as_ref().ok_or_else(missing_section)?;
            flat_line_test(values, series.require_times("flat line test")?, c)
        }
        TestKind::AttenuatedSignal => {
            let c = config.attenuated_signal.as_ref().ok_or_else(missing_section)?;
            attenuated_signal_test(values, series.times.as_deref(), c)
        }
        TestKind::Location => {
            let c = config.location.as_ref().ok_or_else(missing_section)?;
            let (Some(lat), Some(lon)) = (&series.lat, &series.lon) else {
                return Err(Error::shape(
                    "location test requires latitudes and longitudes".to_string(),
                ));
            };
            location_test(lon, lat, c)
        }
        TestKind::Climatology => {
            let c = config.climatology.as_ref().ok_or_else(missing_section)?;
            climatology_test(
                values,
                series.require_times("climatology test")?,
                series.depth.as_deref(),
                c,
            )
        }
    }
}

/// Run every configured test for a variable and aggregate the flags
fn evaluate_variable(
    name: &str,
    config: &VariableConfig,
    series: &ObservationSeries,
) -> Result<VariableReport> {
    series.validate()?;

    let mut results = BTreeMap::new();
    for kind in config.configured_tests() {
        debug!("Running {} on '{}'", kind, name);
        results.insert(kind, run_test(kind, config, series)?);
    }

    let aggregate = aggregate(&series.values, results.values())?;
    let summary = FlagSummary::from_flags(&aggregate);
    info!("Variable '{}': {}", name, summary.summary());

    Ok(VariableReport {
        name: name.to_string(),
        results,
        aggregate,
        summary,
    })
}
