//! Shell completion scripts for `remotectl`.
//!
//! Covers every subcommand and global flag of [`Cli`], including the nested
//! `screen` commands, so completion scripts never need hand editing.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::error::CliError;

/// Name completions are registered under; matches the `[[bin]]` target
const BIN_NAME: &str = "remotectl";

/// Writes the completion script for `shell` to stdout
pub fn cmd_completions(shell: Shell) -> Result<(), CliError> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
    Ok(())
}
