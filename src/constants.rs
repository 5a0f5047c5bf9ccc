//! Application constants for QARTOD quality control
//!
//! This module contains the flag codes, default test parameters and
//! helper lookups used throughout the library. Everything here is
//! read-only; there is no process-wide mutable state.

// =============================================================================
// QARTOD Flag Codes
// =============================================================================

/// Primary flag values as defined by the QARTOD convention
pub mod qartod_flags {
    /// Data passed the test
    pub const GOOD: u8 = 1;

    /// Test was not evaluated or could not be judged
    pub const UNKNOWN: u8 = 2;

    /// Data is of questionable quality
    pub const SUSPECT: u8 = 3;

    /// Data failed the test
    pub const FAIL: u8 = 4;

    /// Source value is absent
    pub const MISSING: u8 = 9;
}

// =============================================================================
// Test Defaults
// =============================================================================

/// Default tolerance factor applied to the deviation in the rate of change test
pub const DEFAULT_NUM_DEVIATIONS: f64 = 3.0;

/// Default time unit (seconds) the rate of change is expressed in
pub const DEFAULT_RATE_UNIT_SECS: i64 = 1;

/// Fewest samples a rolling standard deviation is computed from
pub const MIN_DEVIATION_SAMPLES: usize = 2;

/// Default minimum number of present samples in an attenuated signal window
pub const DEFAULT_ATTENUATED_MIN_SAMPLES: usize = 2;

/// Default flat line tolerance
pub const DEFAULT_FLAT_LINE_TOLERANCE: f64 = 0.0;

/// Default location bounding box as (min_lon, min_lat, max_lon, max_lat)
pub const DEFAULT_BBOX: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

/// Mean Earth radius in meters (IUGG)
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

// =============================================================================
// Runner and CLI Defaults
// =============================================================================

/// Default number of variables evaluated concurrently by the runner
pub const DEFAULT_MAX_CONCURRENT_VARIABLES: usize = 4;

/// Log level for different operation types
pub const LOG_LEVEL_INFO: &str = "info";
pub const LOG_LEVEL_DEBUG: &str = "debug";
pub const LOG_LEVEL_WARN: &str = "warn";

// =============================================================================
// Helper Functions
// =============================================================================

/// Get flag description for human-readable output
pub fn flag_description(code: u8) -> &'static str {
    match code {
        qartod_flags::GOOD => "Good - passed the test",
        qartod_flags::UNKNOWN => "Unknown - not evaluated",
        qartod_flags::SUSPECT => "Suspect - questionable quality",
        qartod_flags::FAIL => "Fail - failed the test",
        qartod_flags::MISSING => "Missing - no data available",
        _ => "Unrecognised flag",
    }
}

/// Check if a flag code represents data fit for use
pub fn is_usable_flag(code: u8, include_suspect: bool) -> bool {
    match code {
        qartod_flags::GOOD => true,
        qartod_flags::SUSPECT => include_suspect,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_descriptions() {
        assert_eq!(
            flag_description(qartod_flags::GOOD),
            "Good - passed the test"
        );
        assert_eq!(
            flag_description(qartod_flags::MISSING),
            "Missing - no data available"
        );
        assert_eq!(flag_description(7), "Unrecognised flag");
    }

    #[test]
    fn test_usable_flag() {
        assert!(is_usable_flag(qartod_flags::GOOD, false));
        assert!(!is_usable_flag(qartod_flags::SUSPECT, false));
        assert!(is_usable_flag(qartod_flags::SUSPECT, true));
        assert!(!is_usable_flag(qartod_flags::FAIL, true));
        assert!(!is_usable_flag(qartod_flags::UNKNOWN, true));
        assert!(!is_usable_flag(qartod_flags::MISSING, true));
    }
}
