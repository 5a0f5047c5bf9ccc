//! Command-line argument definitions for the QARTOD QC tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::constants::{LOG_LEVEL_DEBUG, LOG_LEVEL_INFO, LOG_LEVEL_WARN};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the QARTOD quality control tool
///
/// Runs QARTOD tests configured in a JSON file over a JSON observation
/// document and reports per-test and aggregate flags.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qartod-qc",
    version,
    about = "Flag oceanographic observations with QARTOD quality control tests",
    long_about = "Runs the QARTOD gross range, spike, rate of change, flat line, attenuated signal, \
                  location and climatology tests over time-stamped observations, then aggregates \
                  the per-test flags (1 GOOD, 2 UNKNOWN, 3 SUSPECT, 4 FAIL, 9 MISSING) into a \
                  single worst-case flag per observation."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the configured tests over an observation document
    Run(RunArgs),
    /// Check a QC configuration file without running it
    Validate(ValidateArgs),
}

/// Arguments for the run command
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// QC configuration file (JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to QC configuration file (JSON)"
    )]
    pub config: PathBuf,

    /// Observation document (JSON)
    ///
    /// Holds shared `time`, `lat`, `lon` and `depth` arrays plus a
    /// `variables` map of value arrays, with `null` for missing values.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Path to observation document (JSON)"
    )]
    pub input: PathBuf,

    /// Report output file
    ///
    /// If not specified, only the console summary is printed.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Write the full flag report to this file (JSON)"
    )]
    pub output: Option<PathBuf>,

    /// Override the configured number of concurrently evaluated variables
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of variables evaluated concurrently"
    )]
    pub workers: Option<usize>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// QC configuration file (JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to QC configuration file (JSON)"
    )]
    pub config: PathBuf,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl RunArgs {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            log_level_for(self.verbose)
        }
    }
}

impl ValidateArgs {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.verbose)
    }
}

fn log_level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => LOG_LEVEL_WARN,
        1 => LOG_LEVEL_INFO,
        2 => LOG_LEVEL_DEBUG,
        _ => "trace",
    }
}
