//! File transfer over an SFTP sub-channel
//!
//! Each transfer runs inside [`Client::with_file_channel`], which opens a
//! sub-channel, hands it to the transfer body and closes it on every exit
//! path before the result is returned.

use std::path::Path;

use crate::error::{RemoteError, RemoteResult};
use crate::remote::Client;
use crate::transport::{FileChannel, TransportError};

fn transfer_error(action: &str, path: &str, err: &TransportError) -> RemoteError {
    RemoteError::Transfer(format!("{action} {path}: {err}"))
}

impl Client {
    /// Runs `body` with a fresh SFTP sub-channel, closing it afterwards
    /// whether `body` succeeded or not
    async fn with_file_channel<T>(
        &self,
        remote_path: &str,
        body: impl AsyncFnOnce(&mut Box<dyn FileChannel>) -> Result<T, TransportError>,
    ) -> RemoteResult<T> {
        let link = self.session().handle()?;
        let mut channel = link
            .transport
            .open_file_channel()
            .await
            .map_err(|e| transfer_error("open channel for", remote_path, &e))?;

        let result = body(&mut channel).await;
        if let Err(err) = channel.close().await {
            tracing::debug!(error = %err, "Error closing SFTP channel");
        }
        result.map_err(|e| transfer_error("transfer", remote_path, &e))
    }

    /// Copies a local file to `remote_path`
    pub async fn upload(&self, local_path: &Path, remote_path: &str) -> RemoteResult<()> {
        let contents = tokio::fs::read(local_path).await?;
        self.with_file_channel(remote_path, async |channel| {
            channel.write_file(remote_path, &contents).await
        })
        .await?;

        tracing::info!(
            local = %local_path.display(),
            remote = remote_path,
            bytes = contents.len(),
            "Uploaded file"
        );
        Ok(())
    }

    /// Copies `remote_path` to a local file
    pub async fn download(&self, remote_path: &str, local_path: &Path) -> RemoteResult<()> {
        let contents = self
            .with_file_channel(remote_path, async |channel| {
                channel.read_file(remote_path).await
            })
            .await?;

        tokio::fs::write(local_path, &contents).await?;
        tracing::info!(
            remote = remote_path,
            local = %local_path.display(),
            bytes = contents.len(),
            "Downloaded file"
        );
        Ok(())
    }
}
