//! Detachable `screen` sessions on the remote host
//!
//! A session goes absent → running → (killed | exits) → absent. The
//! registry never caches the listing: every resolve asks the host again, so
//! a handle from an earlier listing only resolves while the session lives.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::command::{CommandLine, CommandRunner};
use crate::error::{RemoteError, RemoteResult};
use crate::remote::parser;

/// One remote `screen` session
///
/// Equality and hashing use the pid only.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenSession {
    /// Pid of the screen server process
    pub pid: u32,
    /// Session name
    pub name: String,
    /// Start time, minute precision
    pub start: NaiveDateTime,
    /// State as reported by `screen -ls` (`Detached`, `Attached`, ...)
    pub state: String,
}

impl ScreenSession {
    /// Creates a session record
    #[must_use]
    pub fn new(
        pid: u32,
        name: impl Into<String>,
        start: NaiveDateTime,
        state: impl Into<String>,
    ) -> Self {
        Self {
            pid,
            name: name.into(),
            start,
            state: state.into(),
        }
    }
}

impl PartialEq for ScreenSession {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for ScreenSession {}

impl Hash for ScreenSession {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}

impl fmt::Display for ScreenSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pid, self.name)
    }
}

/// How a caller designates a screen session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenIdentifier {
    /// Pid of the session
    ById(u32),
    /// `pid.name` or the bare name
    ByName(String),
    /// A session from an earlier listing
    ByHandle(ScreenSession),
}

impl ScreenIdentifier {
    fn matches(&self, session: &ScreenSession) -> bool {
        match self {
            Self::ById(pid) => session.pid == *pid,
            Self::ByName(name) => session.name == *name || session.to_string() == *name,
            Self::ByHandle(handle) => handle == session,
        }
    }
}

impl fmt::Display for ScreenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(pid) => write!(f, "{pid}"),
            Self::ByName(name) => write!(f, "{name}"),
            Self::ByHandle(session) => write!(f, "{session}"),
        }
    }
}

impl From<u32> for ScreenIdentifier {
    fn from(pid: u32) -> Self {
        Self::ById(pid)
    }
}

impl From<&str> for ScreenIdentifier {
    fn from(name: &str) -> Self {
        Self::ByName(name.to_string())
    }
}

impl From<String> for ScreenIdentifier {
    fn from(name: String) -> Self {
        Self::ByName(name)
    }
}

impl From<ScreenSession> for ScreenIdentifier {
    fn from(session: ScreenSession) -> Self {
        Self::ByHandle(session)
    }
}

impl From<&ScreenSession> for ScreenIdentifier {
    fn from(session: &ScreenSession) -> Self {
        Self::ByHandle(session.clone())
    }
}

/// Lists, creates, kills and renames screen sessions
#[derive(Debug, Clone)]
pub struct ScreenRegistry {
    runner: CommandRunner,
}

impl ScreenRegistry {
    /// Creates a registry issuing commands through `runner`
    #[must_use]
    pub const fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    /// Every session `screen -ls` reports
    pub async fn list(&self) -> RemoteResult<Vec<ScreenSession>> {
        let result = self.runner.run("screen -ls").await?.check(&[0, 1])?;
        Ok(parser::parse_screens(&result.stdout))
    }

    /// Finds the live session designated by `identifier`
    pub async fn resolve(
        &self,
        identifier: impl Into<ScreenIdentifier>,
    ) -> RemoteResult<ScreenSession> {
        let identifier = identifier.into();
        self.list()
            .await?
            .into_iter()
            .find(|session| identifier.matches(session))
            .ok_or_else(|| RemoteError::Lookup(format!("screen session {identifier}")))
    }

    /// Starts `command` under `bash -c` in a new detached session `name`
    pub async fn create(&self, command: &str, name: &str) -> RemoteResult<()> {
        if self.list().await?.iter().any(|session| session.name == name) {
            return Err(RemoteError::NameCollision(name.to_string()));
        }
        self.runner
            .run(
                CommandLine::new("screen -dmS {} bash -c {}")
                    .arg(name)
                    .arg(command),
            )
            .await?
            .check(&[0])?;
        tracing::info!(name, "Screen session created");
        Ok(())
    }

    /// Quits the session; false when `screen` reports a failure
    pub async fn kill(&self, identifier: impl Into<ScreenIdentifier>) -> RemoteResult<bool> {
        let session = self.resolve(identifier).await?;
        let exit_code = match self
            .runner
            .run(CommandLine::new("screen -X -S {} quit").arg(&session))
            .await
        {
            Ok(result) => result.exit_code,
            // No exit status at all reads as a failed quit, not a fault
            Err(RemoteError::ExitCode(code)) => code,
            Err(err) => return Err(err),
        };
        if exit_code == 0 {
            tracing::info!(session = %session, "Screen session killed");
            Ok(true)
        } else {
            tracing::warn!(session = %session, exit_code, "Screen quit failed");
            Ok(false)
        }
    }

    /// Renames the session to `new_name`
    pub async fn rename(
        &self,
        identifier: impl Into<ScreenIdentifier>,
        new_name: &str,
    ) -> RemoteResult<()> {
        let session = self.resolve(identifier).await?;
        self.runner
            .run(
                CommandLine::new("screen -S {} -X sessionname {}")
                    .arg(&session)
                    .arg(new_name),
            )
            .await?
            .check(&[0])?;
        tracing::info!(session = %session, new_name, "Screen session renamed");
        Ok(())
    }
}
