//! Conjunto CLI
//!
//! Single-command training entry point for the conjunto library.
//!
//! # Usage
//!
//! ```bash
//! # Train five members with the defaults
//! conjunto
//!
//! # Smaller, faster run
//! conjunto --models 2 --epochs 20 --batch-size 32 --early-stop 5
//!
//! # Distinct per-member seeds for ensemble diversity
//! conjunto --distinct-seeds
//! ```

use clap::Parser;
use conjunto::cli::run_command;
use conjunto::config::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
