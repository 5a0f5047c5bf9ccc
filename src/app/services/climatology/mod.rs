//! Climatology membership matching
//!
//! A [`ClimatologyConfig`] is an ordered list of [`Span`]s. Spans may overlap;
//! lookups walk the list in insertion order and the first span whose time
//! window (and depth interval, when it has one) contains the observation wins.
//!
//! # Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use qartod_qc::app::models::ValueSpan;
//! use qartod_qc::app::services::climatology::{ClimatologyConfig, MonthDay, Span, TimeWindow};
//!
//! # fn example() -> qartod_qc::Result<()> {
//! let winter = TimeWindow::day_of_year(MonthDay::new(11, 1)?, MonthDay::new(2, 28)?);
//! let january = TimeWindow::day_of_year(MonthDay::new(1, 1)?, MonthDay::new(1, 31)?);
//!
//! let mut config = ClimatologyConfig::new();
//! config.add(Span::new(winter, ValueSpan::new(0.0, 12.0)?));
//! config.add(Span::new(january, ValueSpan::new(2.0, 8.0)?));
//!
//! let t = Utc.with_ymd_and_hms(2021, 1, 15, 0, 0, 0).unwrap();
//! assert_eq!(config.find(&t, None).unwrap().suspect_span().max(), 12.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod span;
pub mod time_window;

#[cfg(test)]
pub mod tests;

pub use span::{Span, SpanSettings};
pub use time_window::{MonthDay, TimeWindow, TimeWindowSetting};

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Ordered collection of climatology spans
///
/// Built once through [`ClimatologyConfig::add`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ClimatologyConfig {
    spans: Vec<Span>,
}

impl ClimatologyConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span; earlier spans take precedence
    pub fn add(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Builder form of [`ClimatologyConfig::add`]
    pub fn with_span(mut self, span: Span) -> Self {
        self.add(span);
        self
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// First span applying to an observation at `time` and `depth`
    pub fn find(&self, time: &DateTime<Utc>, depth: Option<f64>) -> Option<&Span> {
        self.spans.iter().find(|span| span.matches(time, depth))
    }

    /// Validate the configuration for use by the climatology test
    pub fn validate(&self) -> Result<()> {
        if self.spans.is_empty() {
            return Err(Error::configuration(
                "Climatology configuration has no spans".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromIterator<Span> for ClimatologyConfig {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Self {
            spans: iter.into_iter().collect(),
        }
    }
}
