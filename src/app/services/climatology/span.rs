//! Climatology span: expected value bounds for a time window and depth range

use super::time_window::TimeWindow;
use crate::app::models::{QartodFlag, ValueSpan};
use crate::app::services::qartod::gross_range::{check_nested_spans, classify_range};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A climatology rule binding a time window and optional depth interval to
/// expected value bounds
///
/// A span without a depth interval matches any depth, missing included. A
/// span without a fail interval can only yield GOOD or SUSPECT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SpanSettings")]
pub struct Span {
    time: TimeWindow,
    depth: Option<ValueSpan>,
    suspect_span: ValueSpan,
    fail_span: Option<ValueSpan>,
}

/// Unvalidated span as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct SpanSettings {
    pub time: TimeWindow,
    #[serde(default)]
    pub depth: Option<ValueSpan>,
    pub suspect_span: ValueSpan,
    #[serde(default)]
    pub fail_span: Option<ValueSpan>,
}

impl Span {
    /// Create a span applying at every depth
    pub fn new(time: TimeWindow, suspect_span: ValueSpan) -> Self {
        Self {
            time,
            depth: None,
            suspect_span,
            fail_span: None,
        }
    }

    /// Restrict the span to an inclusive depth interval
    pub fn with_depth(mut self, depth: ValueSpan) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Add a fail interval enclosing the suspect interval.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the suspect span reaches outside
    /// `fail_span`.
    pub fn with_fail_span(mut self, fail_span: ValueSpan) -> Result<Self> {
        check_nested_spans(Some(&fail_span), Some(&self.suspect_span))?;
        self.fail_span = Some(fail_span);
        Ok(self)
    }

    pub fn time(&self) -> &TimeWindow {
        &self.time
    }

    pub fn depth(&self) -> Option<&ValueSpan> {
        self.depth.as_ref()
    }

    pub fn suspect_span(&self) -> &ValueSpan {
        &self.suspect_span
    }

    pub fn fail_span(&self) -> Option<&ValueSpan> {
        self.fail_span.as_ref()
    }

    /// Check if the span applies to an observation at `time` and `depth`
    pub fn matches(&self, time: &DateTime<Utc>, depth: Option<f64>) -> bool {
        if !self.time.contains(time) {
            return false;
        }
        match &self.depth {
            None => true,
            Some(interval) => depth.is_some_and(|z| interval.contains(z)),
        }
    }

    /// Flag a value against the span's bounds
    pub fn classify(&self, value: Option<f64>) -> QartodFlag {
        classify_range(value, self.fail_span.as_ref(), Some(&self.suspect_span))
    }
}

impl TryFrom<SpanSettings> for Span {
    type Error = Error;

    fn try_from(settings: SpanSettings) -> Result<Self> {
        let mut span = Span::new(settings.time, settings.suspect_span);
        if let Some(depth) = settings.depth {
            span = span.with_depth(depth);
        }
        match settings.fail_span {
            Some(fail_span) => span.with_fail_span(fail_span),
            None => Ok(span),
        }
    }
}
