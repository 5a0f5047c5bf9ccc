//! Gross range test
//!
//! Flags values outside the sensor's operating span as FAIL and values
//! outside an optional, narrower user span as SUSPECT.

use crate::app::models::{FlagSeries, QartodFlag, ValueSpan};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Validated gross range parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "GrossRangeSettings")]
pub struct GrossRangeConfig {
    fail_span: ValueSpan,
    suspect_span: Option<ValueSpan>,
}

/// Unvalidated gross range parameters as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct GrossRangeSettings {
    pub fail_span: ValueSpan,
    #[serde(default)]
    pub suspect_span: Option<ValueSpan>,
}

impl GrossRangeConfig {
    /// Create a configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `suspect_span` is not contained in
    /// `fail_span`.
    pub fn new(fail_span: ValueSpan, suspect_span: Option<ValueSpan>) -> Result<Self> {
        check_nested_spans(Some(&fail_span), suspect_span.as_ref())?;
        Ok(Self {
            fail_span,
            suspect_span,
        })
    }

    /// Create a configuration from bound pairs
    pub fn from_bounds(fail: (f64, f64), suspect: Option<(f64, f64)>) -> Result<Self> {
        let fail_span = ValueSpan::new(fail.0, fail.1)?;
        let suspect_span = suspect.map(|(a, b)| ValueSpan::new(a, b)).transpose()?;
        Self::new(fail_span, suspect_span)
    }

    pub fn fail_span(&self) -> &ValueSpan {
        &self.fail_span
    }

    pub fn suspect_span(&self) -> Option<&ValueSpan> {
        self.suspect_span.as_ref()
    }

    /// Flag a single value
    pub fn classify(&self, value: Option<f64>) -> QartodFlag {
        classify_range(value, Some(&self.fail_span), self.suspect_span.as_ref())
    }
}

impl TryFrom<GrossRangeSettings> for GrossRangeConfig {
    type Error = Error;

    fn try_from(settings: GrossRangeSettings) -> Result<Self> {
        Self::new(settings.fail_span, settings.suspect_span)
    }
}

/// Reject a suspect span that reaches outside its fail span
pub(crate) fn check_nested_spans(
    fail_span: Option<&ValueSpan>,
    suspect_span: Option<&ValueSpan>,
) -> Result<()> {
    if let (Some(fail), Some(suspect)) = (fail_span, suspect_span) {
        if !fail.contains_span(suspect) {
            return Err(Error::configuration(format!(
                "Suspect span {} may not exceed fail span {}",
                suspect, fail
            )));
        }
    }
    Ok(())
}

/// Gross range semantics shared with the climatology test
pub(crate) fn classify_range(
    value: Option<f64>,
    fail_span: Option<&ValueSpan>,
    suspect_span: Option<&ValueSpan>,
) -> QartodFlag {
    let Some(value) = value else {
        return QartodFlag::Missing;
    };
    if value.is_nan() {
        return QartodFlag::Missing;
    }
    if fail_span.is_some_and(|span| !span.contains(value)) {
        return QartodFlag::Fail;
    }
    if suspect_span.is_some_and(|span| !span.contains(value)) {
        return QartodFlag::Suspect;
    }
    QartodFlag::Good
}

/// Run the gross range test over a value series
pub fn gross_range_test(values: &[Option<f64>], config: &GrossRangeConfig) -> FlagSeries {
    let flags: FlagSeries = values.iter().map(|&v| config.classify(v)).collect();

    debug!(
        "Gross range test: {} values, fail span {}, {} FAIL, {} SUSPECT",
        flags.len(),
        config.fail_span,
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Suspect)
    );

    flags
}
