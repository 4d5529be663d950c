//! Host summary command.

use remotectl_core::Client;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Info command handler
pub async fn cmd_info(client: &Client, format: OutputFormat) -> Result<(), CliError> {
    let info = client.info().await?;
    match format {
        OutputFormat::Text => println!("{info}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&info)
                .map_err(|e| CliError::Remote(format!("Failed to serialize report: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}
