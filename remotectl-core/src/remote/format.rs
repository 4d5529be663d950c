//! Display formatting for remote facts

use chrono::TimeDelta;

use super::facts::{MemoryUsage, StorageUsage};

/// Disk blocks (1K) per displayed "GB"
pub const GB: f64 = 1_000_000.0;

/// `48.3°C`
#[must_use]
pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.1}°C")
}

/// Per-core percentages separated by two spaces, then the average in
/// parentheses; `0%` when there is no per-core data
#[must_use]
pub fn format_cpu(usage: &[f64]) -> String {
    if usage.is_empty() {
        return "0%".to_string();
    }
    let cores: Vec<String> = usage.iter().map(|u| format!("{:.2}%", u * 100.0)).collect();
    let average = usage.iter().sum::<f64>() * 100.0 / usage.len() as f64;
    format!("{}  ({average:.2}%)", cores.join("  "))
}

/// `7227MB / 12500MB (57.81%)`
#[must_use]
pub fn format_memory(memory: MemoryUsage) -> String {
    let used = memory.used_kib as f64;
    let total = memory.total_kib as f64;
    format!(
        "{:.0}MB / {:.0}MB ({:.2}%)",
        used / 1024.0,
        total / 1024.0,
        memory.percent()
    )
}

/// `d` days then `HH:MM:SS`; negative durations show as zero
#[must_use]
pub fn format_uptime(elapsed: TimeDelta) -> String {
    if elapsed < TimeDelta::zero() {
        return "0d 00:00:00".to_string();
    }
    let total = elapsed.num_seconds();
    let (minutes, seconds) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let (days, hours) = (hours / 24, hours % 24);
    format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
}

/// `6.05GB / 30.26GB (19.99%)`; total is raised to used when smaller
#[must_use]
pub fn format_storage(storage: StorageUsage) -> String {
    if storage.used_kib == 0 && storage.total_kib == 0 {
        return "0.00GB / 0.00GB (0.00%)".to_string();
    }
    let used = storage.used_kib as f64;
    let total = storage.total_kib.max(storage.used_kib) as f64;
    format!(
        "{:.2}GB / {:.2}GB ({:.2}%)",
        used / GB,
        total / GB,
        used * 100.0 / total
    )
}
