//! QARTOD quality control tests
//!
//! Each test takes one or more equal-length input series plus a validated
//! configuration and returns one [`QartodFlag`](crate::app::models::QartodFlag)
//! per observation. Tests are pure functions of their inputs; running one
//! twice on the same data yields the same flags.
//!
//! # Architecture
//!
//! - [`gross_range`] - Sensor and user value bounds
//! - [`spike`] - Single-sample departures from both neighbours
//! - [`rate_of_change`] - Excessive change per unit time
//! - [`flat_line`] - Repeated values over a time threshold
//! - [`attenuated_signal`] - Too little variability in a window
//! - [`location`] - Position plausibility
//! - [`climatology`] - Seasonal/depth bounds from ordered spans
//! - [`aggregate`] - Worst-case combination of per-test flags
//! - [`rolling`] - Window bounds and rolling statistics shared by the
//!   variability tests
//!
//! # Missing Data
//!
//! A missing value at the evaluated index always yields `MISSING`. Tests
//! that cannot decide for lack of history or neighbours yield `UNKNOWN`.
//! Neither is an error; errors are reserved for malformed configuration
//! and mismatched input shapes.
//!
//! # Example Usage
//!
//! ```rust
//! use qartod_qc::app::models::{QartodFlag, values_from_raw};
//! use qartod_qc::app::services::qartod::{GrossRangeConfig, gross_range_test};
//!
//! # fn example() -> qartod_qc::Result<()> {
//! let config = GrossRangeConfig::from_bounds((0.0, 10.0), Some((2.0, 8.0)))?;
//! let values = values_from_raw(&[5.0, 9.0, 11.0, f64::NAN]);
//!
//! let flags = gross_range_test(&values, &config);
//! assert_eq!(
//!     flags.as_slice(),
//!     &[QartodFlag::Good, QartodFlag::Suspect, QartodFlag::Fail, QartodFlag::Missing]
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod aggregate;
pub mod attenuated_signal;
pub mod climatology;
pub mod flat_line;
pub mod gross_range;
pub mod location;
pub mod rate_of_change;
pub mod rolling;
pub mod spike;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use aggregate::{aggregate, aggregate_flags};
pub use attenuated_signal::{AttenuatedSignalConfig, Statistic, attenuated_signal_test};
pub use climatology::climatology_test;
pub use flat_line::{FlatLineConfig, flat_line_test};
pub use gross_range::{GrossRangeConfig, gross_range_test};
pub use location::{BoundingBox, LocationConfig, Polygon, great_circle_distance, location_test};
pub use rate_of_change::{Deviation, RateOfChangeConfig, rate_of_change_test};
pub use rolling::{Window, WindowStats, rolling_stats};
pub use spike::{SpikeConfig, SpikeMethod, spike_test};

use serde::{Deserialize, Serialize};

/// Identifies a QARTOD test in reports and configuration files
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    GrossRange,
    Spike,
    RateOfChange,
    FlatLine,
    AttenuatedSignal,
    Location,
    Climatology,
}

impl TestKind {
    /// All tests in execution order
    pub fn all_values() -> [TestKind; 7] {
        [
            TestKind::GrossRange,
            TestKind::Spike,
            TestKind::RateOfChange,
            TestKind::FlatLine,
            TestKind::AttenuatedSignal,
            TestKind::Location,
            TestKind::Climatology,
        ]
    }

    /// Configuration key of the test
    pub fn name(self) -> &'static str {
        match self {
            TestKind::GrossRange => "gross_range",
            TestKind::Spike => "spike",
            TestKind::RateOfChange => "rate_of_change",
            TestKind::FlatLine => "flat_line",
            TestKind::AttenuatedSignal => "attenuated_signal",
            TestKind::Location => "location",
            TestKind::Climatology => "climatology",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
