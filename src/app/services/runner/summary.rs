//! Flag count summaries for reports

use crate::app::models::{FlagSeries, QartodFlag};
use serde::Serialize;

/// Number of observations carrying each flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagSummary {
    pub total: usize,
    pub good: usize,
    pub unknown: usize,
    pub suspect: usize,
    pub fail: usize,
    pub missing: usize,
}

impl FlagSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the flags of a series
    pub fn from_flags(flags: &FlagSeries) -> Self {
        let mut summary = Self::new();
        for flag in flags.iter() {
            summary.record(flag);
        }
        summary
    }

    /// Count one flag
    pub fn record(&mut self, flag: QartodFlag) {
        self.total += 1;
        match flag {
            QartodFlag::Good => self.good += 1,
            QartodFlag::Unknown => self.unknown += 1,
            QartodFlag::Suspect => self.suspect += 1,
            QartodFlag::Fail => self.fail += 1,
            QartodFlag::Missing => self.missing += 1,
        }
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: &FlagSummary) {
        self.total += other.total;
        self.good += other.good;
        self.unknown += other.unknown;
        self.suspect += other.suspect;
        self.fail += other.fail;
        self.missing += other.missing;
    }

    /// Count for a given flag
    pub fn count(&self, flag: QartodFlag) -> usize {
        match flag {
            QartodFlag::Good => self.good,
            QartodFlag::Unknown => self.unknown,
            QartodFlag::Suspect => self.suspect,
            QartodFlag::Fail => self.fail,
            QartodFlag::Missing => self.missing,
        }
    }

    /// Share of present observations flagged GOOD (0.0 to 1.0)
    pub fn fraction_good(&self) -> f64 {
        let present = self.total - self.missing;
        if present == 0 {
            0.0
        } else {
            self.good as f64 / present as f64
        }
    }

    /// Check if any observation was flagged SUSPECT or FAIL
    pub fn has_bad(&self) -> bool {
        self.suspect + self.fail > 0
    }

    /// Get summary of flag counts
    pub fn summary(&self) -> String {
        format!(
            "{} observations ({:.1}% good) | Good: {} | Unknown: {} | Suspect: {} | Fail: {} | Missing: {}",
            self.total,
            self.fraction_good() * 100.0,
            self.good,
            self.unknown,
            self.suspect,
            self.fail,
            self.missing
        )
    }
}

impl std::fmt::Display for FlagSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}
