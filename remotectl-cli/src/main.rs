//! `remotectl` - command-line front end for the remotectl core library
//!
//! Opens one SSH session per invocation from the configuration file or the
//! `REMOTECTL_*` environment, runs a single command against the host and
//! exits with a status describing the outcome.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::Cli;
use remotectl_core::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        TracingLevel::Error
    } else {
        TracingLevel::from_verbosity(cli.verbose)
    };
    let tracing_config = TracingConfig::new()
        .with_level(level)
        .with_output(TracingOutput::Stderr);
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let options = commands::GlobalOptions {
        config: cli.config,
        ask_password: cli.ask_password,
    };
    let result = commands::dispatch(&options, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
