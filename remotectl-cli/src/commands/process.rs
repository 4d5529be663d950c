//! Process listing, kill and reboot commands.

use remotectl_core::{Client, ProcessEntry};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Ps command handler
pub async fn cmd_ps(
    client: &Client,
    format: OutputFormat,
    grep: Option<&str>,
) -> Result<(), CliError> {
    let processes: Vec<ProcessEntry> = client
        .processes()
        .await?
        .into_iter()
        .filter(|p| grep.is_none_or(|needle| p.command.contains(needle)))
        .collect();

    match format {
        OutputFormat::Text => print_table(&processes),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&processes)
                .map_err(|e| CliError::Remote(format!("Failed to serialize processes: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_table(processes: &[ProcessEntry]) {
    println!(
        "{:>7} {:>7} {:>6} S {:>8} {:>9} COMMAND",
        "PID", "PPID", "UID", "RSS", "TIME"
    );
    for p in processes {
        println!(
            "{:>7} {:>7} {:>6} {} {:>8} {:>9} {}",
            p.pid, p.ppid, p.uid, p.state, p.rss, p.time, p.command
        );
    }
}

/// Kill command handler; numeric targets are pids, anything else a name
pub async fn cmd_kill(client: &Client, target: &str) -> Result<(), CliError> {
    let killed = match target.parse::<u32>() {
        Ok(pid) => client.kill_by_pid(pid).await?,
        Err(_) => client.kill_by_name(target).await?,
    };
    if killed {
        println!("Killed {target}");
        Ok(())
    } else {
        Err(CliError::Remote(format!("{target} is still running")))
    }
}

/// Reboot command handler
pub async fn cmd_reboot(client: &Client) -> Result<(), CliError> {
    client.reboot().await?;
    println!("Reboot requested");
    Ok(())
}
