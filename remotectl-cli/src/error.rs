//! CLI error types and exit codes.

use remotectl_core::{ConfigError, RemoteError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, lookup, format or local IO errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the session could not be opened or broke down
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Screen session or process not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote command exited with a non-zero status
    #[error("Remote command exited with status {0}")]
    RemoteExit(i32),

    /// Any other failure reported by the remote host
    #[error("{0}")]
    Remote(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RemoteError> for CliError {
    fn from(err: RemoteError) -> Self {
        if err.is_connection_failure() {
            return Self::Connection(err.to_string());
        }
        match err {
            RemoteError::ExitCode(code) => Self::RemoteExit(code),
            RemoteError::Lookup(what) => Self::NotFound(what),
            RemoteError::Io(e) => Self::Io(e),
            other => Self::Remote(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 1: General error (configuration, lookup, IO, malformed output)
    /// - 2: Connection failure
    /// - the remote status for [`CliError::RemoteExit`]
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_) => exit_codes::CONNECTION_FAILURE,
            // Statuses outside 1..=255 cannot be reported as-is
            Self::RemoteExit(code) if *code > 0 && *code < 256 => *code,
            Self::RemoteExit(_)
            | Self::Config(_)
            | Self::NotFound(_)
            | Self::Remote(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
