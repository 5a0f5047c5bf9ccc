//! Attenuated signal test
//!
//! Detects a loss of variability, typically a stuck or dampened sensor, by
//! comparing the standard deviation or peak-to-peak range of a window of
//! samples against minimum thresholds.

use super::rolling::{Window, rolling_stats};
use crate::app::models::{FlagSeries, QartodFlag, check_len, check_times_ordered};
use crate::constants::DEFAULT_ATTENUATED_MIN_SAMPLES;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// Measure of variability compared against the thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Population standard deviation
    #[default]
    #[serde(alias = "std")]
    StdDev,
    /// Peak-to-peak range
    Range,
}

/// Validated attenuated signal parameters
///
/// Windows include the current sample unless told otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "AttenuatedSignalSettings")]
pub struct AttenuatedSignalConfig {
    suspect_threshold: f64,
    fail_threshold: f64,
    window: Window,
    include_current: bool,
    statistic: Statistic,
    min_samples: usize,
}

/// Unvalidated attenuated signal parameters as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct AttenuatedSignalSettings {
    pub suspect_threshold: f64,
    pub fail_threshold: f64,
    pub window: Window,
    #[serde(default = "default_include_current")]
    pub include_current: bool,
    #[serde(default, alias = "check_type")]
    pub statistic: Statistic,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

fn default_include_current() -> bool {
    true
}

fn default_min_samples() -> usize {
    DEFAULT_ATTENUATED_MIN_SAMPLES
}

impl AttenuatedSignalConfig {
    /// Create a standard deviation based configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless both thresholds are finite,
    /// non-negative and `fail_threshold <= suspect_threshold`, or if the
    /// window is invalid.
    pub fn new(suspect_threshold: f64, fail_threshold: f64, window: Window) -> Result<Self> {
        for (name, t) in [("suspect", suspect_threshold), ("fail", fail_threshold)] {
            if !t.is_finite() || t < 0.0 {
                return Err(Error::configuration(format!(
                    "Attenuated signal {name} threshold must be finite and non-negative, got {t}"
                )));
            }
        }
        if fail_threshold > suspect_threshold {
            return Err(Error::configuration(format!(
                "Attenuated signal fail threshold {} exceeds suspect threshold {}",
                fail_threshold, suspect_threshold
            )));
        }
        window.validate()?;

        Ok(Self {
            suspect_threshold,
            fail_threshold,
            window,
            include_current: true,
            statistic: Statistic::default(),
            min_samples: DEFAULT_ATTENUATED_MIN_SAMPLES,
        })
    }

    /// Set the variability measure
    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Set whether each window contains its own sample
    pub fn with_include_current(mut self, include_current: bool) -> Self {
        self.include_current = include_current;
        self
    }

    /// Set the fewest present samples a window must hold to be judged
    pub fn with_min_samples(mut self, min_samples: usize) -> Result<Self> {
        if min_samples == 0 {
            return Err(Error::configuration(
                "Attenuated signal minimum sample count must be at least 1".to_string(),
            ));
        }
        self.min_samples = min_samples;
        Ok(self)
    }

    pub fn suspect_threshold(&self) -> f64 {
        self.suspect_threshold
    }

    pub fn fail_threshold(&self) -> f64 {
        self.fail_threshold
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }
}

impl TryFrom<AttenuatedSignalSettings> for AttenuatedSignalConfig {
    type Error = Error;

    fn try_from(settings: AttenuatedSignalSettings) -> Result<Self> {
        Self::new(
            settings.suspect_threshold,
            settings.fail_threshold,
            settings.window,
        )?
        .with_statistic(settings.statistic)
        .with_include_current(settings.include_current)
        .with_min_samples(settings.min_samples)
    }
}

/// Run the attenuated signal test.
///
/// Timestamps are only required for duration windows.
pub fn attenuated_signal_test(
    values: &[Option<f64>],
    times: Option<&[DateTime<Utc>]>,
    config: &AttenuatedSignalConfig,
) -> Result<FlagSeries> {
    let n = values.len();
    if let Some(times) = times {
        check_len("times", n, times.len())?;
        check_times_ordered(times)?;
    }

    let bounds = config.window.bounds(n, times, config.include_current)?;
    let stats = rolling_stats(values, &bounds);

    let flags: FlagSeries = values
        .iter()
        .zip(stats)
        .map(|(value, stats)| {
            if value.is_none() {
                return QartodFlag::Missing;
            }
            let Some(stats) = stats.filter(|s| s.count >= config.min_samples) else {
                return QartodFlag::Unknown;
            };
            let measure = match config.statistic {
                Statistic::StdDev => stats.std_dev,
                Statistic::Range => stats.range(),
            };
            if measure < config.fail_threshold {
                QartodFlag::Fail
            } else if measure < config.suspect_threshold {
                QartodFlag::Suspect
            } else {
                QartodFlag::Good
            }
        })
        .collect();

    debug!(
        "Attenuated signal test ({:?}, {:?}): {} values, {} FAIL, {} SUSPECT",
        config.statistic,
        config.window,
        n,
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect)
    );

    Ok(flags)
}
