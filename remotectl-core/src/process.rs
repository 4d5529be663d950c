//! Process lookup and termination on the remote host

use crate::command::CommandLine;
use crate::error::{RemoteError, RemoteResult};
use crate::remote::Client;
use crate::remote::parser;
use crate::screen::ScreenIdentifier;

impl Client {
    /// Pid of the process called `name`, `None` when nothing matched
    pub async fn pid(&self, name: &str) -> RemoteResult<Option<u32>> {
        let result = self
            .runner()
            .run(CommandLine::new("pidof {}").arg(name))
            .await?
            .check(&[0, 1])?;
        parser::parse_pid(&result.stdout)
    }

    /// Kills the process called `name`; true when it is gone afterwards
    pub async fn kill_by_name(&self, name: &str) -> RemoteResult<bool> {
        let pid = self
            .pid(name)
            .await?
            .ok_or_else(|| RemoteError::Lookup(format!("pid of {name}")))?;
        self.kill_by_pid(pid).await
    }

    /// Kills `pid`; true when it is gone afterwards
    ///
    /// Screen sessions are quit through `screen` so the socket is cleaned
    /// up. Other processes get `kill -9` and are then looked up in a fresh
    /// process list. That check is a snapshot: a recycled pid reads as
    /// "still running".
    pub async fn kill_by_pid(&self, pid: u32) -> RemoteResult<bool> {
        match self.screens().resolve(ScreenIdentifier::ById(pid)).await {
            Ok(screen) => return self.screens().kill(screen).await,
            Err(RemoteError::Lookup(_)) => {}
            Err(err) => return Err(err),
        }

        self.runner()
            .run(CommandLine::new("kill -9 {}").arg(pid))
            .await?
            .check(&[0])?;
        let killed = self.processes().await?.iter().all(|entry| entry.pid != pid);
        tracing::info!(pid, killed, "Sent SIGKILL");
        Ok(killed)
    }

    /// Reboots the host.
    ///
    /// The host usually drops the connection before replying, so a missing
    /// exit status or a broken transport counts as success.
    pub async fn reboot(&self) -> RemoteResult<()> {
        match self.runner().run("sudo reboot").await {
            Ok(result) => {
                result.check(&[0])?;
            }
            Err(RemoteError::ExitCode(_) | RemoteError::Communication { .. }) => {
                tracing::debug!("Connection dropped while rebooting");
            }
            Err(err) => return Err(err),
        }
        tracing::info!(host = ?self.session().hostname(), "Reboot requested");
        Ok(())
    }
}
