//! Interactive terminal and file browser commands.

use remotectl_core::Client;

use super::screen::identifier;
use crate::error::CliError;

/// Attach command handler: runs the terminal in the foreground until it exits
pub async fn cmd_attach(
    client: &Client,
    screen: Option<&str>,
    command: Option<&str>,
    terminal: Option<&str>,
) -> Result<(), CliError> {
    let mut process = client
        .launch_terminal(terminal, &[], screen.map(identifier), command)
        .await?;
    let status = tokio::task::spawn_blocking(move || process.wait())
        .await
        .map_err(|e| CliError::Remote(format!("Terminal task failed: {e}")))??;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(CliError::RemoteExit(code)),
        None => Err(CliError::Remote("terminal killed by a signal".to_string())),
    }
}

/// Browse command handler
pub fn cmd_browse(client: &Client, program: &str) -> Result<(), CliError> {
    let process = client.open_sftp_browser(program)?;
    tracing::info!(program, pid = process.id(), "Opened file browser");
    Ok(())
}
