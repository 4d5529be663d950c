//! Raw remote command execution.

use remotectl_core::{Client, CommandLine};

use crate::error::CliError;

/// Joins the words into one shell command line; braces are literal
fn command_line(words: &[String]) -> CommandLine {
    CommandLine::new(words.join(" ").replace('{', "{{").replace('}', "}}"))
}

/// Exec command handler: prints the output and fails with the remote status
pub async fn cmd_exec(client: &Client, words: &[String]) -> Result<(), CliError> {
    let result = client.runner().run(command_line(words)).await?;
    if !result.stdout.is_empty() {
        println!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprintln!("{}", result.stderr);
    }
    if result.success() {
        Ok(())
    } else {
        Err(CliError::RemoteExit(result.exit_code))
    }
}
