//! QARTOD Quality Control Library
//!
//! A Rust library for flagging time-stamped scalar oceanographic observations
//! (water level, temperature, salinity, ...) following the QARTOD convention.
//!
//! This library provides tools for:
//! - Running the individual QARTOD tests (gross range, spike, rate of change,
//!   flat line, attenuated signal, location, climatology)
//! - Selecting time/depth-appropriate climatology bounds from ordered spans
//! - Aggregating per-test flags into a single worst-case flag per observation
//! - Loading JSON test configurations and running them over whole documents
//! - Comprehensive error handling with no partial results

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod climatology;
        pub mod qartod;
        pub mod runner;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{FlagSeries, ObservationSeries, QartodFlag, ValueSpan};
pub use app::services::climatology::{ClimatologyConfig, Span, TimeWindow};
pub use app::services::qartod::aggregate::{aggregate, aggregate_flags};
pub use config::QcConfig;

/// Result type alias for QARTOD QC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for QARTOD QC operations
///
/// Indeterminate data (missing values, short history, unmatched climatology)
/// is never an error; it is expressed through `UNKNOWN` and `MISSING` flags.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed test or climatology parameters
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Parallel inputs of different length, unordered timestamps or a
    /// required input array that was not supplied
    #[error("Shape error: {message}")]
    Shape { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A worker task could not be joined
    #[error("Task error: {message}")]
    Task { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a shape error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create a shape error for two parallel arrays of different length
    pub fn length_mismatch(what: &str, expected: usize, found: usize) -> Self {
        Self::Shape {
            message: format!("{what} has length {found}, expected {expected}"),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a task error
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// True for errors raised by parameter validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// True for errors raised by input shape validation
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
