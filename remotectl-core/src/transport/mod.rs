//! Secure-shell transport seam
//!
//! The session layer only depends on these traits. [`SshConnector`] is the
//! production implementation on top of `russh`; tests drive the session
//! with an in-memory connector instead.

mod ssh;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SessionParams;

pub use ssh::SshConnector;

/// Failures reported by a transport implementation
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level timeout (connect or command)
    #[error("Timed out")]
    Timeout,

    /// Credentials were rejected
    #[error("Authentication rejected: {0}")]
    Authentication(String),

    /// Remote closed the stream (reset, EOF, hang-up)
    #[error("Connection closed by remote: {0}")]
    Disconnected(String),

    /// Any other protocol failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Local I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns true when the transport is known to be dead
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Disconnected(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Raw output of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Bytes written to stdout
    pub stdout: Vec<u8>,
    /// Bytes written to stderr
    pub stderr: Vec<u8>,
    /// Exit status, `None` when the channel closed before it was sent
    pub exit_status: Option<u32>,
}

/// An authenticated connection to the remote host
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Runs one command line to completion
    async fn exec(&self, command: &str) -> Result<ExecOutput, TransportError>;

    /// Cheap liveness check, no round trip
    fn is_alive(&self) -> bool;

    /// Opens a file-transfer sub-channel
    async fn open_file_channel(&self) -> Result<Box<dyn FileChannel>, TransportError>;

    /// Tears the connection down; must be idempotent
    async fn close(&self);
}

/// Opens transports from session parameters
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes and authenticates a new transport.
    ///
    /// Anything partially set up is released before an error is returned.
    async fn connect(&self, params: &SessionParams) -> Result<Arc<dyn Transport>, TransportError>;
}

/// A file-transfer sub-channel scoped to one transfer
#[async_trait]
pub trait FileChannel: Send {
    /// Reads a whole remote file
    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError>;

    /// Creates or truncates a remote file with `contents`
    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), TransportError>;

    /// Releases the sub-channel
    async fn close(self: Box<Self>) -> Result<(), TransportError>;
}
