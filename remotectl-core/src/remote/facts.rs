//! Typed facts about the remote host
//!
//! Everything here is plain data produced by [`super::parser`] and rendered
//! by [`super::format`]; none of it talks to the host.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// One line of `ps -ely`
///
/// Two entries are equal when they have the same pid, so a `HashSet`
/// deduplicates by process.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessEntry {
    /// Process state (`S`, `R`, `Z`, ...)
    pub state: String,
    /// Owner user id
    pub uid: u32,
    /// Process id
    pub pid: u32,
    /// Parent process id
    pub ppid: u32,
    /// Processor utilization column (`C`)
    pub cpu: String,
    /// Priority
    pub priority: String,
    /// Nice value (`-` for real-time classes)
    pub nice: String,
    /// Resident set size (KiB)
    pub rss: u64,
    /// Virtual size in pages
    pub size: u64,
    /// Kernel wait channel
    pub wchan: String,
    /// Controlling terminal
    pub tty: String,
    /// Cumulative CPU time
    pub time: String,
    /// Command name
    pub command: String,
}

impl PartialEq for ProcessEntry {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for ProcessEntry {}

impl Hash for ProcessEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}

/// Memory usage in kibibytes, as reported by `free`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    /// Total minus free (KiB)
    pub used_kib: u64,
    /// Total physical memory (KiB)
    pub total_kib: u64,
}

impl MemoryUsage {
    /// Returns memory usage as a percentage (0.0–100.0)
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total_kib == 0 {
            return 0.0;
        }
        self.used_kib as f64 * 100.0 / self.total_kib as f64
    }
}

/// Disk usage summed over every `/`-mounted device of `df` (1K blocks)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageUsage {
    /// Used blocks
    pub used_kib: u64,
    /// Total blocks
    pub total_kib: u64,
}

/// Snapshot of every formatted fact about the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    /// Hostname the session is configured with
    pub hostname: String,
    /// SSH port
    pub port: u16,
    /// e.g. `48.3°C`
    pub temperature: String,
    /// Per-core usage and the average
    pub cpu: String,
    /// Used / total memory
    pub memory: String,
    /// Time since boot
    pub uptime: String,
    /// Used / total disk
    pub storage: String,
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hostname    : {}", self.hostname)?;
        writeln!(f, "port        : {}", self.port)?;
        writeln!(f, "temperature : {}", self.temperature)?;
        writeln!(f, "cpu         : {}", self.cpu)?;
        writeln!(f, "memory      : {}", self.memory)?;
        writeln!(f, "uptime      : {}", self.uptime)?;
        write!(f, "storage     : {}", self.storage)
    }
}
