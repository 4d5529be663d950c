//! In-memory transport for exercising sessions without a remote host
//!
//! [`FakeConnector`] hands out [`FakeTransport`]s that all share one
//! [`FakeRemote`]: scripted command replies, a command log, injected
//! failures and an in-memory file store for the SFTP sub-channel. Front
//! ends use it to test their polling loops; the crate's own tests use it
//! for everything above the transport seam.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::config::SessionParams;
use crate::transport::{Connector, ExecOutput, FileChannel, Transport, TransportError};

/// Computes the reply for a command that has no exact-match script
pub type Responder = dyn Fn(&str) -> Result<ExecOutput, TransportError> + Send + Sync;

/// Result of the next connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Connect successfully
    Connect,
    /// Reject the credentials
    AuthFailure,
    /// Report a network timeout
    Timeout,
    /// Never complete (the session timeout must fire)
    Hang,
    /// Report a protocol failure
    Refused,
}

/// Builds a successful [`ExecOutput`]
#[must_use]
pub fn reply(stdout: &str) -> ExecOutput {
    reply_with(stdout, "", 0)
}

/// Builds an [`ExecOutput`] with explicit stderr and exit status
#[must_use]
pub fn reply_with(stdout: &str, stderr: &str, exit_status: u32) -> ExecOutput {
    ExecOutput {
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        exit_status: Some(exit_status),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared by every transport of one [`FakeConnector`]
pub struct FakeRemote {
    scripted: Mutex<HashMap<String, ExecOutput>>,
    responder: Mutex<Arc<Responder>>,
    failures: Mutex<VecDeque<TransportError>>,
    log: Mutex<Vec<String>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    channels_opened: AtomicUsize,
    channels_closed: AtomicUsize,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            scripted: Mutex::new(HashMap::new()),
            responder: Mutex::new(Arc::new(|_: &str| Ok(reply("")))),
            failures: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
            files: Mutex::new(HashMap::new()),
            channels_opened: AtomicUsize::new(0),
            channels_closed: AtomicUsize::new(0),
        }
    }
}

impl FakeRemote {
    fn exec(&self, command: &str) -> Result<ExecOutput, TransportError> {
        lock(&self.log).push(command.to_string());
        if let Some(err) = lock(&self.failures).pop_front() {
            return Err(err);
        }
        if let Some(output) = lock(&self.scripted).get(command) {
            return Ok(output.clone());
        }
        let responder = Arc::clone(&lock(&self.responder));
        responder(command)
    }
}

/// Connector producing in-memory transports
pub struct FakeConnector {
    remote: Arc<FakeRemote>,
    outcomes: Mutex<VecDeque<Outcome>>,
    attempts: AtomicUsize,
    last_params: Mutex<Option<SessionParams>>,
    transports: Mutex<Vec<Arc<FakeTransport>>>,
}

impl FakeConnector {
    /// Creates a connector whose commands all succeed with empty output
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            remote: Arc::new(FakeRemote::default()),
            outcomes: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            last_params: Mutex::new(None),
            transports: Mutex::new(Vec::new()),
        })
    }

    /// Queues the outcome of a future connection attempt (default: connect)
    pub fn push_outcome(&self, outcome: Outcome) {
        lock(&self.outcomes).push_back(outcome);
    }

    /// Scripts the reply for an exact command line
    pub fn script(&self, command: impl Into<String>, output: ExecOutput) {
        lock(&self.remote.scripted).insert(command.into(), output);
    }

    /// Replaces the fallback responder
    pub fn set_responder(
        &self,
        responder: impl Fn(&str) -> Result<ExecOutput, TransportError> + Send + Sync + 'static,
    ) {
        *lock(&self.remote.responder) = Arc::new(responder);
    }

    /// Makes the next command fail with `err` before any script applies
    pub fn fail_next(&self, err: TransportError) {
        lock(&self.remote.failures).push_back(err);
    }

    /// Every command line executed so far, across transports
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        lock(&self.remote.log).clone()
    }

    /// How many times `command` was executed
    #[must_use]
    pub fn count(&self, command: &str) -> usize {
        lock(&self.remote.log)
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }

    /// Number of connection attempts
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent attempt
    #[must_use]
    pub fn last_params(&self) -> Option<SessionParams> {
        lock(&self.last_params).clone()
    }

    /// Marks every transport handed out so far as dead
    pub fn drop_connections(&self) {
        for transport in lock(&self.transports).iter() {
            transport.alive.store(false, Ordering::SeqCst);
        }
    }

    /// Contents of a file in the in-memory store
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.remote.files).get(path).cloned()
    }

    /// Seeds a file in the in-memory store
    pub fn put_file(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        lock(&self.remote.files).insert(path.into(), contents.into());
    }

    /// (opened, closed) counts of file-transfer sub-channels
    #[must_use]
    pub fn file_channels(&self) -> (usize, usize) {
        (
            self.remote.channels_opened.load(Ordering::SeqCst),
            self.remote.channels_closed.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, params: &SessionParams) -> Result<Arc<dyn Transport>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_params) = Some(params.clone());

        let outcome = lock(&self.outcomes).pop_front().unwrap_or(Outcome::Connect);
        match outcome {
            Outcome::Connect => {
                let transport = Arc::new(FakeTransport {
                    remote: Arc::clone(&self.remote),
                    alive: AtomicBool::new(true),
                });
                lock(&self.transports).push(Arc::clone(&transport));
                Ok(transport)
            }
            Outcome::AuthFailure => Err(TransportError::Authentication(
                "password rejected".to_string(),
            )),
            Outcome::Timeout => Err(TransportError::Timeout),
            Outcome::Hang => std::future::pending().await,
            Outcome::Refused => Err(TransportError::Protocol("connection refused".to_string())),
        }
    }
}

/// Transport backed by a [`FakeRemote`]
pub struct FakeTransport {
    remote: Arc<FakeRemote>,
    alive: AtomicBool,
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTransport")
            .field("alive", &self.alive.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn exec(&self, command: &str) -> Result<ExecOutput, TransportError> {
        if !self.is_alive() {
            return Err(TransportError::Disconnected("transport closed".to_string()));
        }
        let result = self.remote.exec(command);
        if let Err(err) = &result
            && err.is_disconnect()
        {
            self.alive.store(false, Ordering::SeqCst);
        }
        result
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn open_file_channel(&self) -> Result<Box<dyn FileChannel>, TransportError> {
        if !self.is_alive() {
            return Err(TransportError::Disconnected("transport closed".to_string()));
        }
        self.remote.channels_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeFileChannel {
            remote: Arc::clone(&self.remote),
        }))
    }

    async fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

struct FakeFileChannel {
    remote: Arc<FakeRemote>,
}

#[async_trait]
impl FileChannel for FakeFileChannel {
    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        lock(&self.remote.files).get(path).cloned().ok_or_else(|| {
            TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such remote file: {path}"),
            ))
        })
    }

    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), TransportError> {
        lock(&self.remote.files).insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        self.remote.channels_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
