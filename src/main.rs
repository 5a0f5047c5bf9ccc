use anyhow::anyhow;
use clap::Parser;
use qartod_qc::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result: anyhow::Result<()> = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => {
                result.map(|_| ()).map_err(anyhow::Error::from)
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow!("QC run interrupted by user"))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("qartod-qc - QARTOD Quality Control for Oceanographic Observations");
    println!("==================================================================");
    println!();
    println!("Flag time-stamped observations with the QARTOD tests and aggregate");
    println!("the results into a single worst-case flag per observation.");
    println!();
    println!("USAGE:");
    println!("    qartod-qc <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run         Run configured tests over an observation document");
    println!("    validate    Check a QC configuration file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Run QC and write the full flag report:");
    println!("    qartod-qc run --config qc.json --input observations.json --output report.json");
    println!();
    println!("    # Check a configuration file:");
    println!("    qartod-qc validate --config qc.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    qartod-qc <COMMAND> --help");
}
