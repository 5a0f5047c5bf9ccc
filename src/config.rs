//! Configuration management and validation.
//!
//! A [`QcConfig`] maps variable names to the QARTOD tests to run on them.
//! Each per-test section deserialises straight into the test's validated
//! configuration, so a file that loads is a file that can run.

use crate::app::services::climatology::ClimatologyConfig;
use crate::app::services::qartod::{
    AttenuatedSignalConfig, FlatLineConfig, GrossRangeConfig, LocationConfig, RateOfChangeConfig,
    SpikeConfig, TestKind,
};
use crate::constants::DEFAULT_MAX_CONCURRENT_VARIABLES;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Tests configured for a single variable
///
/// Absent sections are not run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    #[serde(default)]
    pub gross_range: Option<GrossRangeConfig>,
    #[serde(default)]
    pub spike: Option<SpikeConfig>,
    #[serde(default)]
    pub rate_of_change: Option<RateOfChangeConfig>,
    #[serde(default)]
    pub flat_line: Option<FlatLineConfig>,
    #[serde(default)]
    pub attenuated_signal: Option<AttenuatedSignalConfig>,
    #[serde(default)]
    pub location: Option<LocationConfig>,
    #[serde(default)]
    pub climatology: Option<ClimatologyConfig>,
}

impl VariableConfig {
    /// Tests with a configuration section, in execution order
    pub fn configured_tests(&self) -> Vec<TestKind> {
        TestKind::all_values()
            .into_iter()
            .filter(|kind| match kind {
                TestKind::GrossRange => self.gross_range.is_some(),
                TestKind::Spike => self.spike.is_some(),
                TestKind::RateOfChange => self.rate_of_change.is_some(),
                TestKind::FlatLine => self.flat_line.is_some(),
                TestKind::AttenuatedSignal => self.attenuated_signal.is_some(),
                TestKind::Location => self.location.is_some(),
                TestKind::Climatology => self.climatology.is_some(),
            })
            .collect()
    }

    /// True when no test is configured
    pub fn is_empty(&self) -> bool {
        self.configured_tests().is_empty()
    }

    pub fn with_gross_range(mut self, config: GrossRangeConfig) -> Self {
        self.gross_range = Some(config);
        self
    }

    pub fn with_spike(mut self, config: SpikeConfig) -> Self {
        self.spike = Some(config);
        self
    }

    pub fn with_rate_of_change(mut self, config: RateOfChangeConfig) -> Self {
        self.rate_of_change = Some(config);
        self
    }

    pub fn with_flat_line(mut self, config: FlatLineConfig) -> Self {
        self.flat_line = Some(config);
        self
    }

    pub fn with_attenuated_signal(mut self, config: AttenuatedSignalConfig) -> Self {
        self.attenuated_signal = Some(config);
        self
    }

    pub fn with_location(mut self, config: LocationConfig) -> Self {
        self.location = Some(config);
        self
    }

    pub fn with_climatology(mut self, config: ClimatologyConfig) -> Self {
        self.climatology = Some(config);
        self
    }
}

/// Main quality control configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QcConfig {
    /// Per-variable test configurations
    pub variables: BTreeMap<String, VariableConfig>,

    /// Upper bound on variables evaluated at once
    #[serde(default = "default_max_concurrent_variables")]
    pub max_concurrent_variables: usize,
}

fn default_max_concurrent_variables() -> usize {
    DEFAULT_MAX_CONCURRENT_VARIABLES
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
            max_concurrent_variables: DEFAULT_MAX_CONCURRENT_VARIABLES,
        }
    }
}

impl QcConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: QcConfig = serde_json::from_str(json)
            .map_err(|e| Error::json("Failed to parse QC configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading QC configuration from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read QC configuration {}", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&contents)
    }

    /// Add or replace the tests for a variable
    pub fn with_variable(mut self, name: impl Into<String>, config: VariableConfig) -> Self {
        self.variables.insert(name.into(), config);
        self
    }

    /// Create configuration with a custom concurrency bound
    pub fn with_max_concurrent_variables(mut self, max: usize) -> Self {
        self.max_concurrent_variables = max;
        self
    }

    /// Get the configuration for a variable
    pub fn variable(&self, name: &str) -> Option<&VariableConfig> {
        self.variables.get(name)
    }

    /// Total number of configured tests across all variables
    pub fn test_count(&self) -> usize {
        self.variables
            .values()
            .map(|v| v.configured_tests().len())
            .sum()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.variables.is_empty() {
            return Err(Error::configuration(
                "QC configuration defines no variables".to_string(),
            ));
        }
        if self.max_concurrent_variables == 0 {
            return Err(Error::configuration(
                "max_concurrent_variables must be at least 1".to_string(),
            ));
        }
        for (name, variable) in &self.variables {
            if variable.is_empty() {
                return Err(Error::configuration(format!(
                    "Variable '{}' has no tests configured",
                    name
                )));
            }
            if let Some(climatology) = &variable.climatology {
                climatology.validate().map_err(|e| {
                    Error::configuration(format!("Variable '{}': {}", name, e))
                })?;
            }
        }
        Ok(())
    }
}
