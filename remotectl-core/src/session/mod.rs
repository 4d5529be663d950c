//! Long-lived SSH session
//!
//! A [`Session`] owns at most one live transport, the parameters it was
//! built from and a generation counter bumped on every connection attempt.
//! `connect`, `reconnect` and `close` serialize on an exclusion guard owned
//! by the session, so independent sessions to different hosts never contend.
//! The transport and its generation share one slot that is only ever
//! swapped while the guard is held; readers copy the `Arc` out and never
//! observe a half torn-down transport.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::{SessionConfig, SessionParams};
use crate::error::{RemoteError, RemoteResult};
use crate::transport::{Connector, SshConnector, Transport, TransportError};

/// Live transport together with the generation it belongs to
#[derive(Debug, Clone)]
pub struct Link {
    /// The transport
    pub transport: Arc<dyn Transport>,
    /// Generation that created it
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    transport: Option<Arc<dyn Transport>>,
    generation: u64,
}

/// Proof that the exclusion guard is held
struct Exclusive<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// SSH session with connect / reconnect / close lifecycle
pub struct Session {
    connector: Arc<dyn Connector>,
    params: RwLock<SessionParams>,
    slot: RwLock<Slot>,
    guard: Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.params();
        f.debug_struct("Session")
            .field("hostname", &params.hostname)
            .field("port", &params.port)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an unconfigured, disconnected session
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_params(connector, SessionParams::default())
    }

    /// Creates a disconnected session holding `params`
    #[must_use]
    pub fn with_params(connector: Arc<dyn Connector>, params: SessionParams) -> Self {
        Self {
            connector,
            params: RwLock::new(params),
            slot: RwLock::new(Slot::default()),
            guard: Mutex::new(()),
        }
    }

    /// Creates an SSH session from a loaded configuration and connects it
    pub async fn from_config(config: SessionConfig) -> RemoteResult<Self> {
        let session = Self::with_params(Arc::new(SshConnector::new()), config.into_params());
        session.reconnect().await?;
        Ok(session)
    }

    /// Replaces the parameters and connects with them
    pub async fn connect(&self, params: SessionParams) -> RemoteResult<()> {
        let held = self.exclusive().await;
        *self.params.write().unwrap_or_else(PoisonError::into_inner) = params;
        self.reconnect_locked(&held).await
    }

    /// Drops the current transport and opens a fresh one
    pub async fn reconnect(&self) -> RemoteResult<()> {
        let held = self.exclusive().await;
        self.reconnect_locked(&held).await
    }

    async fn reconnect_locked(&self, held: &Exclusive<'_>) -> RemoteResult<()> {
        self.teardown(held).await;

        let generation = self.bump_generation(held);
        let params = self.params();
        let Some(address) = params.address() else {
            return Err(RemoteError::MissingHostname);
        };

        tracing::info!(%address, generation, "Opening SSH session");

        let attempt = tokio::time::timeout(params.timeout, self.connector.connect(&params)).await;
        match attempt {
            Ok(Ok(transport)) => {
                self.install(held, transport);
                tracing::info!(%address, generation, "SSH session established");
                Ok(())
            }
            Ok(Err(TransportError::Timeout)) | Err(_) => {
                self.teardown(held).await;
                tracing::warn!(%address, generation, "SSH connection timed out");
                Err(RemoteError::Timeout(format!(
                    "socket to {address} timed out, maybe wrong port or hostname"
                )))
            }
            Ok(Err(err)) => {
                self.teardown(held).await;
                tracing::warn!(%address, generation, error = %err, "SSH connection failed");
                Err(match err {
                    TransportError::Authentication(msg) => RemoteError::Authentication(msg),
                    TransportError::Io(e) => RemoteError::Io(e),
                    other => RemoteError::Communication {
                        command: format!("connect {address}"),
                        source: other,
                    },
                })
            }
        }
    }

    /// Closes the session; closing a closed session is a no-op
    pub async fn close(&self) {
        let held = self.exclusive().await;
        self.teardown(&held).await;
    }

    /// Closes the session only if `generation` is still current.
    ///
    /// Returns true when a transport was torn down.
    pub async fn close_generation(&self, generation: u64) -> bool {
        let held = self.exclusive().await;
        if self.generation() != generation {
            tracing::debug!(
                generation,
                current = self.generation(),
                "Skipping close of a superseded transport"
            );
            return false;
        }
        self.teardown(&held).await
    }

    /// True iff a transport exists and reports itself alive
    #[must_use]
    pub fn connected(&self) -> bool {
        self.read_slot()
            .transport
            .as_ref()
            .is_some_and(|transport| transport.is_alive())
    }

    /// Fails with [`RemoteError::NotConnected`] unless [`Self::connected`]
    pub fn check_connection(&self) -> RemoteResult<()> {
        if self.connected() {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }

    /// Returns the live transport or [`RemoteError::NotConnected`]
    pub fn handle(&self) -> RemoteResult<Link> {
        let slot = self.read_slot();
        match &slot.transport {
            Some(transport) if transport.is_alive() => Ok(Link {
                transport: Arc::clone(transport),
                generation: slot.generation,
            }),
            _ => Err(RemoteError::NotConnected),
        }
    }

    /// Number of connection attempts so far
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read_slot().generation
    }

    /// Snapshot of the current parameters
    #[must_use]
    pub fn params(&self) -> SessionParams {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Configured hostname
    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        self.params().hostname
    }

    /// Configured port
    #[must_use]
    pub fn port(&self) -> u16 {
        self.params().port
    }

    /// Configured login name
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.params().username
    }

    /// Timeout applied to connecting and to each command
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.params().timeout
    }

    async fn exclusive(&self) -> Exclusive<'_> {
        Exclusive {
            _guard: self.guard.lock().await,
        }
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_generation(&self, _held: &Exclusive<'_>) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.generation
    }

    fn install(&self, _held: &Exclusive<'_>, transport: Arc<dyn Transport>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.transport = Some(transport);
    }

    /// Swaps the transport out and closes it. Only callable with the guard.
    async fn teardown(&self, _held: &Exclusive<'_>) -> bool {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .transport
            .take();
        match previous {
            Some(transport) => {
                transport.close().await;
                tracing::debug!("SSH transport closed");
                true
            }
            None => false,
        }
    }
}
