//! File transfer commands.

use std::path::Path;

use remotectl_core::Client;

use crate::error::CliError;

/// Upload command handler
pub async fn cmd_upload(client: &Client, src: &Path, dest: &str) -> Result<(), CliError> {
    client.upload(src, dest).await?;
    println!("Uploaded {} to {dest}", src.display());
    Ok(())
}

/// Download command handler
pub async fn cmd_download(client: &Client, src: &str, dest: &Path) -> Result<(), CliError> {
    client.download(src, dest).await?;
    println!("Downloaded {src} to {}", dest.display());
    Ok(())
}
