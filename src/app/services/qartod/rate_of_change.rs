//! Rate of change test
//!
//! Flags a sample as SUSPECT when its rate of change from the previous sample
//! exceeds `num_deviations` times a deviation. The deviation is either fixed
//! or the rolling standard deviation of the series. There is no FAIL tier.

use super::rolling::{Window, WindowStats, rolling_stats};
use crate::app::models::{FlagSeries, QartodFlag, check_len, check_times_ordered, delta_from_secs};
use crate::constants::{DEFAULT_NUM_DEVIATIONS, DEFAULT_RATE_UNIT_SECS, MIN_DEVIATION_SAMPLES};
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::debug;

/// Source of the deviation the rate bound is scaled from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deviation {
    /// A constant deviation
    Fixed(f64),
    /// Population standard deviation of the values in a rolling window
    Rolling {
        window: Window,
        include_current: bool,
    },
}

impl Default for Deviation {
    fn default() -> Self {
        Deviation::Rolling {
            window: Window::Expanding,
            include_current: false,
        }
    }
}

/// Validated rate of change parameters
///
/// Defaults: three deviations, rolling deviation over all prior samples
/// (current sample excluded), rate expressed per second.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RateOfChangeSettings")]
pub struct RateOfChangeConfig {
    num_deviations: f64,
    deviation: Deviation,
    rate_unit: TimeDelta,
}

/// Unvalidated rate of change parameters as read from a configuration file
///
/// Giving `deviation` selects a fixed deviation; otherwise `window` and
/// `include_current` describe the rolling one.
#[derive(Debug, Clone, Deserialize)]
pub struct RateOfChangeSettings {
    #[serde(default = "default_num_deviations")]
    pub num_deviations: f64,
    #[serde(default)]
    pub deviation: Option<f64>,
    #[serde(default)]
    pub window: Option<Window>,
    #[serde(default)]
    pub include_current: bool,
    #[serde(default = "default_rate_unit_secs")]
    pub rate_unit_secs: i64,
}

fn default_num_deviations() -> f64 {
    DEFAULT_NUM_DEVIATIONS
}

fn default_rate_unit_secs() -> i64 {
    DEFAULT_RATE_UNIT_SECS
}

impl RateOfChangeConfig {
    /// Create a configuration with a rolling expanding-window deviation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `num_deviations` is finite and
    /// positive.
    pub fn new(num_deviations: f64) -> Result<Self> {
        if !num_deviations.is_finite() || num_deviations <= 0.0 {
            return Err(Error::configuration(format!(
                "Number of deviations must be finite and positive, got {}",
                num_deviations
            )));
        }
        Ok(Self {
            num_deviations,
            deviation: Deviation::default(),
            rate_unit: TimeDelta::seconds(DEFAULT_RATE_UNIT_SECS),
        })
    }

    /// Use the rolling standard deviation over `window`
    pub fn with_window(mut self, window: Window, include_current: bool) -> Result<Self> {
        window.validate()?;
        self.deviation = Deviation::Rolling {
            window,
            include_current,
        };
        Ok(self)
    }

    /// Use a constant deviation
    pub fn with_fixed_deviation(mut self, deviation: f64) -> Result<Self> {
        if !deviation.is_finite() || deviation < 0.0 {
            return Err(Error::configuration(format!(
                "Deviation must be finite and non-negative, got {}",
                deviation
            )));
        }
        self.deviation = Deviation::Fixed(deviation);
        Ok(self)
    }

    /// Express rates per `unit` of elapsed time
    pub fn with_rate_unit(mut self, unit: TimeDelta) -> Result<Self> {
        if unit <= TimeDelta::zero() {
            return Err(Error::configuration(format!(
                "Rate unit must be positive, got {}s",
                delta_secs(unit)
            )));
        }
        self.rate_unit = unit;
        Ok(self)
    }

    pub fn num_deviations(&self) -> f64 {
        self.num_deviations
    }

    pub fn deviation(&self) -> Deviation {
        self.deviation
    }

    pub fn rate_unit(&self) -> TimeDelta {
        self.rate_unit
    }
}

impl TryFrom<RateOfChangeSettings> for RateOfChangeConfig {
    type Error = Error;

    fn try_from(settings: RateOfChangeSettings) -> Result<Self> {
        let config = Self::new(settings.num_deviations)?
            .with_rate_unit(delta_from_secs(settings.rate_unit_secs)?)?;
        match (settings.deviation, settings.window) {
            (Some(_), Some(_)) => Err(Error::configuration(
                "Rate of change takes either a fixed deviation or a window, not both".to_string(),
            )),
            (Some(deviation), None) => config.with_fixed_deviation(deviation),
            (None, window) => config.with_window(
                window.unwrap_or(Window::Expanding),
                settings.include_current,
            ),
        }
    }
}

/// Duration in fractional seconds, at nanosecond precision where it fits
fn delta_secs(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// Run the rate of change test over a timed value series
pub fn rate_of_change_test(
    values: &[Option<f64>],
    times: &[DateTime<Utc>],
    config: &RateOfChangeConfig,
) -> Result<FlagSeries> {
    let n = values.len();
    check_len("times", n, times.len())?;
    check_times_ordered(times)?;

    let rolling: Option<Vec<Option<WindowStats>>> = match config.deviation {
        Deviation::Fixed(_) => None,
        Deviation::Rolling {
            window,
            include_current,
        } => {
            let bounds = window.bounds(n, Some(times), include_current)?;
            Some(rolling_stats(values, &bounds))
        }
    };
    let unit_secs = delta_secs(config.rate_unit);

    let flags: FlagSeries = (0..n)
        .map(|i| {
            let Some(value) = values[i] else {
                return QartodFlag::Missing;
            };
            if i == 0 {
                return QartodFlag::Unknown;
            }
            let Some(prev) = values[i - 1] else {
                return QartodFlag::Unknown;
            };
            let elapsed = times[i] - times[i - 1];
            if elapsed <= TimeDelta::zero() {
                return QartodFlag::Unknown;
            }

            let deviation = match (&config.deviation, &rolling) {
                (Deviation::Fixed(d), _) => *d,
                (Deviation::Rolling { .. }, Some(stats)) => match stats[i] {
                    Some(s) if s.count >= MIN_DEVIATION_SAMPLES => s.std_dev,
                    _ => return QartodFlag::Unknown,
                },
                (Deviation::Rolling { .. }, None) => return QartodFlag::Unknown,
            };

            let rate = (value - prev).abs() / (delta_secs(elapsed) / unit_secs);
            if rate.is_nan() {
                QartodFlag::Unknown
            } else if rate > config.num_deviations * deviation {
                QartodFlag::Suspect
            } else {
                QartodFlag::Good
            }
        })
        .collect();

    debug!(
        "Rate of change test: {} values, {} SUSPECT, {} UNKNOWN",
        n,
        flags.count(QartodFlag::Suspect),
        flags.count(QartodFlag::Unknown)
    );

    Ok(flags)
}
