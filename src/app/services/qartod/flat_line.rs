//! Flat line test
//!
//! Flags samples that have stayed within `tolerance` of the current value for
//! too long. Run lengths are measured in elapsed time, so irregular sampling
//! is handled without resampling.

use crate::app::models::{FlagSeries, QartodFlag, check_len, check_times_ordered, delta_from_secs};
use crate::constants::DEFAULT_FLAT_LINE_TOLERANCE;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::debug;

/// Validated flat line parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "FlatLineSettings")]
pub struct FlatLineConfig {
    suspect_threshold: TimeDelta,
    fail_threshold: TimeDelta,
    tolerance: f64,
}

/// Unvalidated flat line parameters as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct FlatLineSettings {
    pub suspect_threshold_secs: i64,
    pub fail_threshold_secs: i64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_FLAT_LINE_TOLERANCE
}

impl FlatLineConfig {
    /// Create a configuration with zero tolerance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless both thresholds are positive and
    /// `suspect_threshold <= fail_threshold`.
    pub fn new(suspect_threshold: TimeDelta, fail_threshold: TimeDelta) -> Result<Self> {
        if suspect_threshold <= TimeDelta::zero() || fail_threshold <= TimeDelta::zero() {
            return Err(Error::configuration(format!(
                "Flat line thresholds must be positive, got suspect {}s and fail {}s",
                suspect_threshold.num_seconds(),
                fail_threshold.num_seconds()
            )));
        }
        if suspect_threshold > fail_threshold {
            return Err(Error::configuration(format!(
                "Flat line suspect threshold {}s exceeds fail threshold {}s",
                suspect_threshold.num_seconds(),
                fail_threshold.num_seconds()
            )));
        }
        Ok(Self {
            suspect_threshold,
            fail_threshold,
            tolerance: DEFAULT_FLAT_LINE_TOLERANCE,
        })
    }

    /// Set the largest difference still counted as "unchanged"
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::configuration(format!(
                "Flat line tolerance must be finite and non-negative, got {}",
                tolerance
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn suspect_threshold(&self) -> TimeDelta {
        self.suspect_threshold
    }

    pub fn fail_threshold(&self) -> TimeDelta {
        self.fail_threshold
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl TryFrom<FlatLineSettings> for FlatLineConfig {
    type Error = Error;

    fn try_from(settings: FlatLineSettings) -> Result<Self> {
        Self::new(
            delta_from_secs(settings.suspect_threshold_secs)?,
            delta_from_secs(settings.fail_threshold_secs)?,
        )?
        .with_tolerance(settings.tolerance)
    }
}

/// Run the flat line test over a timed value series
pub fn flat_line_test(
    values: &[Option<f64>],
    times: &[DateTime<Utc>],
    config: &FlatLineConfig,
) -> Result<FlagSeries> {
    let n = values.len();
    check_len("times", n, times.len())?;
    check_times_ordered(times)?;

    let flags: FlagSeries = (0..n)
        .map(|i| {
            let Some(value) = values[i] else {
                return QartodFlag::Missing;
            };
            // Not enough history to reach even the suspect threshold
            if times[i] - times[0] < config.suspect_threshold {
                return QartodFlag::Unknown;
            }

            let mut run_start = i;
            while run_start > 0 && times[i] - times[run_start] < config.fail_threshold {
                match values[run_start - 1] {
                    Some(prev) if (prev - value).abs() <= config.tolerance => run_start -= 1,
                    _ => break,
                }
            }

            let run = times[i] - times[run_start];
            if run >= config.fail_threshold {
                QartodFlag::Fail
            } else if run >= config.suspect_threshold {
                QartodFlag::Suspect
            } else {
                QartodFlag::Good
            }
        })
        .collect();

    debug!(
        "Flat line test: {} values, {} FAIL, {} SUSPECT",
        n,
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect)
    );

    Ok(flags)
}
