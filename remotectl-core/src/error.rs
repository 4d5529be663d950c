//! Error types for remotectl
//!
//! [`RemoteError`] is what every session, command, fact and screen
//! operation returns. [`ConfigError`] covers loading [`crate::config`]
//! sources and is kept separate because it never involves the remote host.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors raised while talking to the remote host
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Operation attempted without a live session
    #[error("Not connected")]
    NotConnected,

    /// Session has no hostname configured
    #[error("Missing hostname, cannot authenticate")]
    MissingHostname,

    /// Credentials were rejected by the remote host
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network-level timeout while establishing the session
    #[error("Connection timed out: {0}")]
    Timeout(String),

    /// Transport failure in the middle of a command
    #[error("Error occurred during command {command}")]
    Communication {
        /// Rendered command line that was being executed
        command: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Command completed with an unexpected or unavailable exit status
    #[error("Invalid exit code, got {0}")]
    ExitCode(i32),

    /// Remote output did not have the expected shape
    #[error("Invalid format for {field}, got {got:?}")]
    Format {
        /// Name of the fact or record being parsed
        field: String,
        /// Offending text
        got: String,
    },

    /// Screen session or process identifier did not resolve
    #[error("Unresolvable identifier: {0}")]
    Lookup(String),

    /// A screen session with this name already exists
    #[error("Screen session already exists with name {0:?}")]
    NameCollision(String),

    /// File transfer over the SFTP sub-channel failed
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// Local I/O failure (file transfer, launching programs)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Creates a [`RemoteError::Format`] error
    pub fn format(field: impl Into<String>, got: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            got: got.into(),
        }
    }

    /// Returns true for failures a caller should present as "try again"
    ///
    /// Rejected credentials are worth prompting for again and a connect
    /// timeout is usually transient. Everything else is a hard failure of
    /// the requested operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Timeout(_))
    }

    /// Returns true when the failure means the session is unusable
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::MissingHostname
                | Self::Authentication(_)
                | Self::Timeout(_)
                | Self::Communication { .. }
        )
    }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while loading a session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No environment variables and no configuration file were found
    #[error("No environment variables set and no config file found at:{searched}")]
    NotFound {
        /// Pre-rendered list of searched paths
        searched: String,
    },

    /// A required key is absent
    #[error("Missing {0:?} in config")]
    MissingKey(String),

    /// A value could not be interpreted
    #[error("{key:?} must be {expected}")]
    InvalidValue {
        /// Offending key or environment variable
        key: String,
        /// Human readable expectation
        expected: &'static str,
    },

    /// File could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// YAML or TOML did not match the expected mapping
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// Path of the file
        path: PathBuf,
        /// Parser message (includes unknown key names)
        message: String,
    },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
