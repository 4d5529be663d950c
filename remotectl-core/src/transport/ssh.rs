//! `russh` implementation of the transport traits
//!
//! Authentication tries, in order: the configured password, the configured
//! identity file (or the usual `~/.ssh/id_*` keys), then `none`. Unknown
//! host keys are accepted, like `StrictHostKeyChecking=no`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client;
use russh::{ChannelMsg, Disconnect};
use russh_keys::key;
use russh_sftp::client::SftpSession;
use secrecy::ExposeSecret;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Connector, ExecOutput, FileChannel, Transport, TransportError};
use crate::config::SessionParams;

/// Keys tried when no identity file is configured
const DEFAULT_KEY_FILES: [&str; 3] = ["id_ed25519", "id_ecdsa", "id_rsa"];

/// SSH extended data type for stderr
const STDERR_EXT: u32 = 1;

struct HostKeyPolicy;

#[async_trait]
impl client::Handler for HostKeyPolicy {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!(
            fingerprint = %server_public_key.fingerprint(),
            "Accepting server host key"
        );
        Ok(true)
    }
}

/// Opens SSH transports with `russh`
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl SshConnector {
    /// Creates a connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, params: &SessionParams) -> Result<Arc<dyn Transport>, TransportError> {
        let host = params
            .hostname
            .as_deref()
            .ok_or_else(|| TransportError::Protocol("no hostname configured".into()))?;

        let config = Arc::new(client::Config::default());
        let mut handle = client::connect(config, (host, params.port), HostKeyPolicy)
            .await
            .map_err(map_russh_error)?;

        let user = params
            .username
            .clone()
            .or_else(local_username)
            .unwrap_or_else(|| "root".to_string());

        match authenticate(&mut handle, &user, params).await {
            Ok(true) => {
                tracing::debug!(host, port = params.port, user = %user, "SSH authenticated");
                Ok(Arc::new(SshTransport { handle }))
            }
            Ok(false) => {
                disconnect(&handle).await;
                Err(TransportError::Authentication(format!(
                    "no authentication method accepted for {user}"
                )))
            }
            Err(err) => {
                disconnect(&handle).await;
                Err(err)
            }
        }
    }
}

async fn authenticate(
    handle: &mut client::Handle<HostKeyPolicy>,
    user: &str,
    params: &SessionParams,
) -> Result<bool, TransportError> {
    if let Some(password) = &params.password {
        let accepted = handle
            .authenticate_password(user, password.expose_secret())
            .await
            .map_err(map_russh_error)?;
        if accepted {
            return Ok(true);
        }
    }

    for path in key_candidates(params) {
        let key_pair = match russh_keys::load_secret_key(&path, None) {
            Ok(key_pair) => key_pair,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Skipping unusable key");
                continue;
            }
        };
        let accepted = handle
            .authenticate_publickey(user, Arc::new(key_pair))
            .await
            .map_err(map_russh_error)?;
        if accepted {
            return Ok(true);
        }
    }

    handle
        .authenticate_none(user)
        .await
        .map_err(map_russh_error)
}

fn key_candidates(params: &SessionParams) -> Vec<PathBuf> {
    if let Some(path) = &params.identity_file {
        return vec![path.clone()];
    }
    dirs::home_dir()
        .map(|home| {
            DEFAULT_KEY_FILES
                .iter()
                .map(|name| home.join(".ssh").join(name))
                .filter(|path| path.is_file())
                .collect()
        })
        .unwrap_or_default()
}

fn local_username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
}

async fn disconnect(handle: &client::Handle<HostKeyPolicy>) {
    if let Err(err) = handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        tracing::debug!(error = %err, "Error during SSH disconnect");
    }
}

fn map_russh_error(err: russh::Error) -> TransportError {
    match err {
        russh::Error::ConnectionTimeout => TransportError::Timeout,
        russh::Error::IO(e) if e.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout,
        russh::Error::IO(e) => TransportError::Io(e),
        russh::Error::NotAuthenticated => {
            TransportError::Authentication("not authenticated".to_string())
        }
        e @ (russh::Error::Disconnect | russh::Error::HUP | russh::Error::SendError) => {
            TransportError::Disconnected(e.to_string())
        }
        other => TransportError::Protocol(other.to_string()),
    }
}

fn map_sftp_error(err: russh_sftp::client::error::Error) -> TransportError {
    TransportError::Protocol(format!("sftp: {err}"))
}

struct SshTransport {
    handle: client::Handle<HostKeyPolicy>,
}

impl fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshTransport")
            .field("closed", &self.handle.is_closed())
            .finish()
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn exec(&self, command: &str) -> Result<ExecOutput, TransportError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(map_russh_error)?;
        channel.exec(true, command).await.map_err(map_russh_error)?;

        let mut output = ExecOutput::default();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext } if ext == STDERR_EXT => {
                    output.stderr.extend_from_slice(data);
                }
                ChannelMsg::ExitStatus { exit_status } => output.exit_status = Some(exit_status),
                _ => {}
            }
        }
        Ok(output)
    }

    fn is_alive(&self) -> bool {
        !self.handle.is_closed()
    }

    async fn open_file_channel(&self) -> Result<Box<dyn FileChannel>, TransportError> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(map_russh_error)?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(map_russh_error)?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(map_sftp_error)?;
        Ok(Box::new(SftpChannel { sftp }))
    }

    async fn close(&self) {
        if !self.handle.is_closed() {
            disconnect(&self.handle).await;
        }
    }
}

struct SftpChannel {
    sftp: SftpSession,
}

#[async_trait]
impl FileChannel for SftpChannel {
    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        let mut file = self.sftp.open(path).await.map_err(map_sftp_error)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;
        Ok(contents)
    }

    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), TransportError> {
        let mut file = self.sftp.create(path).await.map_err(map_sftp_error)?;
        file.write_all(contents).await?;
        file.shutdown().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        self.sftp.close().await.map_err(map_sftp_error)
    }
}
