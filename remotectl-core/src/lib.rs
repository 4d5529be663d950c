//! `remotectl` Core Library
//!
//! Remote administration of a single host over SSH: a long-lived session
//! with reconnect and generation tracking, shell-safe command execution,
//! typed facts about the host and control of its `screen` sessions.
//!
//! # Crate Structure
//!
//! - [`session`] - Session lifecycle: connect, reconnect, close, generation
//! - [`command`] - Command templates, shell quoting, [`CommandRunner`]
//! - [`remote`] - [`Client`] facade, parsers and formatters for host facts
//! - [`screen`] - Screen session listing, lookup, creation, kill, rename
//! - [`transport`] - Transport traits and the `russh` implementation
//! - [`config`] - Session parameters, environment and file configuration
//! - [`launcher`] - Connection strings and external terminal programs
//! - [`testing`] - In-memory transport for tests and front ends
//!
//! Process control (`pid`, `kill_by_*`, `reboot`) and file transfer
//! (`upload`, `download`) are methods of [`Client`].

#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod error;
pub mod launcher;
mod process;
pub mod remote;
pub mod screen;
pub mod session;
pub mod testing;
pub mod tracing;
mod transfer;
pub mod transport;

pub use command::{CommandLine, CommandResult, CommandRunner, quote};
pub use config::{SessionConfig, SessionParams};
pub use error::{ConfigError, ConfigResult, RemoteError, RemoteResult};
pub use launcher::{DetachedProcess, attach_script, connection_string, sftp_url};
pub use remote::Client;
pub use remote::facts::{HostInfo, MemoryUsage, ProcessEntry, StorageUsage};
pub use screen::{ScreenIdentifier, ScreenRegistry, ScreenSession};
pub use session::{Link, Session};
pub use self::tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
pub use transport::{
    Connector, ExecOutput, FileChannel, SshConnector, Transport, TransportError,
};
