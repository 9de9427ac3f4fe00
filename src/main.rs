//! Binary entry point for buildprune.
//!
//! This binary provides the CLI interface for pruning the build cache.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use buildprune::PruneConfig;
use buildprune::cli::{self, Cli};
use buildprune::observability::{self, LoggingConfig};
use clap::Parser;
use std::process::ExitCode;

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match PruneConfig::load(cli.config.as_deref()) {
        Ok(config) => cli.apply_overrides(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::from(e.exit_code());
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match cli::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        },
    }
}
