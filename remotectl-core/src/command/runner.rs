//! Command execution on the live transport with failure classification

use std::sync::Arc;

use super::{CommandLine, CommandResult};
use crate::error::{RemoteError, RemoteResult};
use crate::session::{Link, Session};
use crate::transport::{ExecOutput, TransportError};

/// Runs commands on a [`Session`]
///
/// A transport failure closes the session when the stream is known to be
/// dead, or when a no-op probe fails as well. Either way the caller gets a
/// [`RemoteError::Communication`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    session: Arc<Session>,
}

impl CommandRunner {
    /// Creates a runner for `session`
    #[must_use]
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// The underlying session
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Renders and runs `command`, returning the raw exit status
    pub async fn run(&self, command: impl Into<CommandLine>) -> RemoteResult<CommandResult> {
        let rendered = command.into().render()?;
        let link = self.session.handle()?;

        let output = match self.exec(&link, &rendered).await {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(command = %rendered, error = %err, "Command failed");
                self.classify(&link, &err).await;
                return Err(RemoteError::Communication {
                    command: rendered,
                    source: err,
                });
            }
        };

        let Some(status) = output.exit_status else {
            tracing::warn!(command = %rendered, "Exit status unavailable");
            return Err(RemoteError::ExitCode(-1));
        };
        let exit_code = i32::try_from(status).unwrap_or(i32::MAX);
        tracing::debug!(command = %rendered, exit_code, "Command completed");
        Ok(CommandResult::new(rendered, &output, exit_code))
    }

    async fn exec(&self, link: &Link, command: &str) -> Result<ExecOutput, TransportError> {
        tokio::time::timeout(self.session.timeout(), link.transport.exec(command))
            .await
            .unwrap_or(Err(TransportError::Timeout))
    }

    async fn classify(&self, link: &Link, err: &TransportError) {
        if err.is_disconnect() {
            self.session.close_generation(link.generation).await;
            return;
        }
        if let Err(probe) = self.exec(link, "").await {
            tracing::error!(error = %probe, "Connection closed");
            self.session.close_generation(link.generation).await;
        }
    }
}
