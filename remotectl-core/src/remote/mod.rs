//! Structured facts about the remote host
//!
//! [`Client`] runs the diagnostic commands through a [`CommandRunner`] and
//! turns their output into typed values. The `fmt_*` variants render the
//! same values for display.

pub mod facts;
pub mod format;
pub mod parser;

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDateTime};

use crate::command::CommandRunner;
use crate::config::SessionConfig;
use crate::error::RemoteResult;
use crate::screen::ScreenRegistry;
use crate::session::Session;

use facts::{HostInfo, MemoryUsage, ProcessEntry, StorageUsage};

/// Remote host facade: facts, processes, screen sessions and transfers
#[derive(Debug)]
pub struct Client {
    runner: CommandRunner,
    screens: ScreenRegistry,
    /// Boot time and the session generation it was read on
    boot_time: Mutex<Option<(u64, NaiveDateTime)>>,
}

impl Client {
    /// Creates a client on an existing session
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        let runner = CommandRunner::new(session);
        Self {
            screens: ScreenRegistry::new(runner.clone()),
            runner,
            boot_time: Mutex::new(None),
        }
    }

    /// Opens an SSH session from `config` and wraps it
    pub async fn connect(config: SessionConfig) -> RemoteResult<Self> {
        let session = Session::from_config(config).await?;
        Ok(Self::new(Arc::new(session)))
    }

    /// The underlying session
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.runner.session()
    }

    /// Command runner shared with the screen registry
    #[must_use]
    pub const fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Screen session registry
    #[must_use]
    pub const fn screens(&self) -> &ScreenRegistry {
        &self.screens
    }

    /// Reopens the session; cached facts from the old one are dropped
    pub async fn reconnect(&self) -> RemoteResult<()> {
        self.boot_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.session().reconnect().await
    }

    /// SoC temperature in °C
    pub async fn temperature(&self) -> RemoteResult<f64> {
        let result = self.runner.run("vcgencmd measure_temp").await?.check(&[0])?;
        parser::parse_temperature(&result.stdout)
    }

    /// Formatted temperature, e.g. `48.3°C`
    pub async fn fmt_temperature(&self) -> RemoteResult<String> {
        Ok(format::format_temperature(self.temperature().await?))
    }

    /// Per-core usage between 0 and 1; empty without per-core data
    pub async fn cpu(&self) -> RemoteResult<Vec<f64>> {
        let result = self.runner.run("mpstat -P ALL 1 1").await?.check(&[0])?;
        parser::parse_cpu(&result.stdout)
    }

    /// Formatted per-core usage with the average
    pub async fn fmt_cpu(&self) -> RemoteResult<String> {
        Ok(format::format_cpu(&self.cpu().await?))
    }

    /// Used and total memory
    pub async fn memory(&self) -> RemoteResult<MemoryUsage> {
        let result = self
            .runner
            .run("free | grep 'Mem:'")
            .await?
            .check(&[0])?;
        parser::parse_memory(&result.stdout)
    }

    /// Formatted memory usage
    pub async fn fmt_memory(&self) -> RemoteResult<String> {
        Ok(format::format_memory(self.memory().await?))
    }

    /// Boot time, queried once per session generation
    pub async fn boot_time(&self) -> RemoteResult<NaiveDateTime> {
        let session = self.session();
        session.check_connection()?;

        let generation = session.generation();
        let cached = *self.boot_time.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_generation, boot)) = cached
            && cached_generation == generation
        {
            return Ok(boot);
        }

        let result = self.runner.run("uptime -s").await?.check(&[0])?;
        let boot = parser::parse_boot_time(&result.stdout)?;
        *self
            .boot_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((generation, boot));
        tracing::debug!(generation, %boot, "Cached boot time");
        Ok(boot)
    }

    /// Formatted time since boot
    pub async fn fmt_uptime(&self) -> RemoteResult<String> {
        let boot = self.boot_time().await?;
        Ok(format::format_uptime(Local::now().naive_local() - boot))
    }

    /// Used and total disk over every `/`-mounted device
    pub async fn storage(&self) -> RemoteResult<StorageUsage> {
        let result = self.runner.run("df").await?.check(&[0])?;
        parser::parse_storage(&result.stdout)
    }

    /// Formatted disk usage
    pub async fn fmt_storage(&self) -> RemoteResult<String> {
        Ok(format::format_storage(self.storage().await?))
    }

    /// Every running process
    pub async fn processes(&self) -> RemoteResult<Vec<ProcessEntry>> {
        let result = self.runner.run("ps -ely").await?.check(&[0])?;
        parser::parse_processes(&result.stdout)
    }

    /// Snapshot of every formatted fact
    pub async fn info(&self) -> RemoteResult<HostInfo> {
        let session = self.session();
        Ok(HostInfo {
            hostname: session.hostname().unwrap_or_default(),
            port: session.port(),
            temperature: self.fmt_temperature().await?,
            cpu: self.fmt_cpu().await?,
            memory: self.fmt_memory().await?,
            uptime: self.fmt_uptime().await?,
            storage: self.fmt_storage().await?,
        })
    }
}
