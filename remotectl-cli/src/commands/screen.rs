//! Screen session management commands.

use remotectl_core::{Client, ScreenIdentifier, ScreenSession};

use crate::cli::{OutputFormat, ScreenCommands};
use crate::error::CliError;

/// Pid, `pid.name` or bare name, as typed on the command line
pub fn identifier(target: &str) -> ScreenIdentifier {
    target
        .parse::<u32>()
        .map_or_else(|_| ScreenIdentifier::from(target), ScreenIdentifier::from)
}

/// Screen command handler
pub async fn cmd_screen(client: &Client, subcmd: ScreenCommands) -> Result<(), CliError> {
    let screens = client.screens();
    match subcmd {
        ScreenCommands::List { format } => {
            let sessions = screens.list().await?;
            print_sessions(&sessions, format)?;
        }
        ScreenCommands::Create { name, command } => {
            screens.create(&command, &name).await?;
            println!("Created screen session '{name}'");
        }
        ScreenCommands::Kill { target } => {
            if !screens.kill(identifier(&target)).await? {
                return Err(CliError::Remote(format!(
                    "screen refused to quit session {target}"
                )));
            }
            println!("Killed screen session {target}");
        }
        ScreenCommands::Rename { target, new_name } => {
            screens.rename(identifier(&target), &new_name).await?;
            println!("Renamed screen session {target} to '{new_name}'");
        }
    }
    Ok(())
}

fn print_sessions(sessions: &[ScreenSession], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(sessions)
                .map_err(|e| CliError::Remote(format!("Failed to serialize sessions: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text if sessions.is_empty() => println!("No screen sessions."),
        OutputFormat::Text => {
            for session in sessions {
                let handle = session.to_string();
                println!(
                    "{handle:<24} {}  ({})",
                    session.start.format("%Y-%m-%d %H:%M"),
                    session.state
                );
            }
        }
    }
    Ok(())
}
