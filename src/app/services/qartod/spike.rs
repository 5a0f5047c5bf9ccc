//! Spike test
//!
//! Compares each interior value against the midpoint of its two neighbours.
//! The first and last sample, and samples next to a gap, cannot be judged and
//! are flagged UNKNOWN.

use crate::app::models::{FlagSeries, QartodFlag};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// How the spike magnitude is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeMethod {
    /// Deviation from the neighbour midpoint, less half the neighbour-to-neighbour
    /// difference. A value lying between its neighbours scores zero or less.
    #[default]
    Differential,
    /// Plain deviation from the neighbour midpoint
    Average,
}

impl SpikeMethod {
    /// Spike magnitude of `value` between `prev` and `next`
    pub fn magnitude(self, prev: f64, value: f64, next: f64) -> f64 {
        let deviation = (value - (prev + next) / 2.0).abs();
        match self {
            SpikeMethod::Differential => deviation - (prev - next).abs() / 2.0,
            SpikeMethod::Average => deviation,
        }
    }
}

/// Validated spike test parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SpikeSettings")]
pub struct SpikeConfig {
    suspect_threshold: f64,
    fail_threshold: f64,
    method: SpikeMethod,
}

/// Unvalidated spike parameters as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct SpikeSettings {
    pub suspect_threshold: f64,
    pub fail_threshold: f64,
    #[serde(default)]
    pub method: SpikeMethod,
}

impl SpikeConfig {
    /// Create a configuration using the differential method.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless both thresholds are finite,
    /// non-negative and `suspect_threshold <= fail_threshold`.
    pub fn new(suspect_threshold: f64, fail_threshold: f64) -> Result<Self> {
        for (name, t) in [("suspect", suspect_threshold), ("fail", fail_threshold)] {
            if !t.is_finite() || t < 0.0 {
                return Err(Error::configuration(format!(
                    "Spike {name} threshold must be finite and non-negative, got {t}"
                )));
            }
        }
        if suspect_threshold > fail_threshold {
            return Err(Error::configuration(format!(
                "Spike suspect threshold {} exceeds fail threshold {}",
                suspect_threshold, fail_threshold
            )));
        }
        Ok(Self {
            suspect_threshold,
            fail_threshold,
            method: SpikeMethod::default(),
        })
    }

    /// Set the spike measure
    pub fn with_method(mut self, method: SpikeMethod) -> Self {
        self.method = method;
        self
    }

    pub fn suspect_threshold(&self) -> f64 {
        self.suspect_threshold
    }

    pub fn fail_threshold(&self) -> f64 {
        self.fail_threshold
    }

    pub fn method(&self) -> SpikeMethod {
        self.method
    }
}

impl TryFrom<SpikeSettings> for SpikeConfig {
    type Error = Error;

    fn try_from(settings: SpikeSettings) -> Result<Self> {
        Ok(Self::new(settings.suspect_threshold, settings.fail_threshold)?
            .with_method(settings.method))
    }
}

/// Run the spike test over a value series
pub fn spike_test(values: &[Option<f64>], config: &SpikeConfig) -> FlagSeries {
    let n = values.len();

    let flags: FlagSeries = (0..n)
        .map(|i| {
            let Some(value) = values[i] else {
                return QartodFlag::Missing;
            };
            if i == 0 || i + 1 == n {
                return QartodFlag::Unknown;
            }
            let (Some(prev), Some(next)) = (values[i - 1], values[i + 1]) else {
                return QartodFlag::Unknown;
            };

            let spike = config.method.magnitude(prev, value, next);
            if spike.is_nan() {
                QartodFlag::Unknown
            } else if spike > config.fail_threshold {
                QartodFlag::Fail
            } else if spike > config.suspect_threshold {
                QartodFlag::Suspect
            } else {
                QartodFlag::Good
            }
        })
        .collect();

    debug!(
        "Spike test ({:?}): {} values, {} FAIL, {} SUSPECT",
        config.method,
        n,
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect)
    );

    flags
}
