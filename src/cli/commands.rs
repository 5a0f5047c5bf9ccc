//! Command implementations for the QARTOD QC CLI
//!
//! This module contains the command execution logic, console reporting and
//! logging setup for the CLI interface.

use crate::app::services::runner::{ObservationDocument, QcRunner, RunReport};
use crate::cli::args::{Args, Commands, RunArgs, ValidateArgs};
use crate::config::QcConfig;
use crate::{Error, Result};
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Main command runner
///
/// Dispatches to the selected subcommand. Returns the run report for `run`
/// and `None` for `validate`.
pub async fn run(args: Args) -> Result<Option<RunReport>> {
    match args.command {
        Some(Commands::Run(run_args)) => run_qc(run_args).await.map(Some),
        Some(Commands::Validate(validate_args)) => {
            validate_config(validate_args)?;
            Ok(None)
        }
        None => Err(Error::configuration("No command given".to_string())),
    }
}

/// Run the configured tests over an observation document
///
/// 1. Load and validate the configuration
/// 2. Load the observation document
/// 3. Evaluate all variables
/// 4. Print a summary and optionally write the full report
pub async fn run_qc(args: RunArgs) -> Result<RunReport> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet);
    info!("Starting QARTOD QC run");
    debug!("Command line arguments: {:?}", args);

    let mut config = QcConfig::from_file(&args.config)?;
    if let Some(workers) = args.workers {
        config = config.with_max_concurrent_variables(workers);
    }
    info!(
        "Loaded {} tests for {} variables from {}",
        config.test_count(),
        config.variables.len(),
        args.config.display()
    );

    let document = ObservationDocument::from_file(&args.input)?;
    info!(
        "Loaded {} variables from {}",
        document.variables.len(),
        args.input.display()
    );

    let runner = QcRunner::new(config)?;
    let report = runner.run_all(document).await?;

    if let Some(output) = &args.output {
        report.write_json(output)?;
        info!("Wrote report to {}", output.display());
    }

    if !args.quiet {
        print_report(&report, start_time);
    }

    Ok(report)
}

/// Load and validate a configuration file, printing what it defines
pub fn validate_config(args: ValidateArgs) -> Result<QcConfig> {
    setup_logging(args.get_log_level(), false);

    let config = QcConfig::from_file(&args.config)?;

    println!(
        "{} {}",
        "Configuration valid:".bright_green().bold(),
        args.config.display()
    );
    for (name, variable) in &config.variables {
        let tests: Vec<String> = variable
            .configured_tests()
            .iter()
            .map(|kind| kind.to_string())
            .collect();
        println!("  {} {}", format!("{}:", name).bright_cyan(), tests.join(", "));
    }

    Ok(config)
}

/// Print a colored console summary of a run
fn print_report(report: &RunReport, start_time: Instant) {
    println!("\n{}", "QC Summary".bright_green().bold());

    for (name, variable) in &report.variables {
        let summary = &variable.summary;
        let fail = if summary.fail > 0 {
            summary.fail.to_string().bright_red().bold()
        } else {
            summary.fail.to_string().bright_white()
        };
        let suspect = if summary.suspect > 0 {
            summary.suspect.to_string().bright_yellow()
        } else {
            summary.suspect.to_string().bright_white()
        };
        println!(
            "  {} {} obs, {:.1}% good, {} suspect, {} fail, {} unknown, {} missing",
            format!("{}:", name).bright_cyan(),
            summary.total.to_string().bright_white().bold(),
            summary.fraction_good() * 100.0,
            suspect,
            fail,
            summary.unknown,
            summary.missing
        );
    }

    if !report.unconfigured.is_empty() {
        println!(
            "  {} {}",
            "Unconfigured:".bright_yellow(),
            report.unconfigured.join(", ")
        );
    }
    if !report.absent.is_empty() {
        println!(
            "  {} {}",
            "Not in input:".bright_yellow(),
            report.absent.join(", ")
        );
    }

    println!(
        "  {} {:.2}s",
        "Time elapsed:".bright_cyan(),
        start_time.elapsed().as_secs_f64()
    );
}

/// Set up structured logging
fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qartod_qc={}", log_level)));

    let result = if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    // A subscriber may already be installed when commands run in-process
    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}
