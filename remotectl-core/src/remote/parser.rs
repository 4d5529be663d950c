//! Parsers for the output of the diagnostic commands
//!
//! Every function takes the trimmed stdout of one command and returns a
//! typed value, or [`RemoteError::Format`] naming what failed to parse.

use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;

use super::facts::{MemoryUsage, ProcessEntry, StorageUsage};
use crate::error::{RemoteError, RemoteResult};
use crate::screen::ScreenSession;

/// Header lines printed by `mpstat -P ALL 1 1` before the per-core averages
const MPSTAT_HEADER_LINES: usize = 11;

/// Number of columns in `ps -ely`
const PS_FIELDS: usize = 13;

const BOOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SCREEN_START_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^temp=(\d+(?:\.\d+)?)'C$").expect("TEMPERATURE_RE is a valid regex pattern")
});

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9]{1,2}(?:;[0-9]{1,2})?m").expect("COLOR_RE is a valid regex pattern")
});

static SCREEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\t(?P<pid>\d{1,8})\.(?P<name>.+)\t\((?P<start>\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})\)\t\((?P<state>.+)\)$",
    )
    .expect("SCREEN_RE is a valid regex pattern")
});

/// Parses `vcgencmd measure_temp`, e.g. `temp=48.3'C`
pub fn parse_temperature(output: &str) -> RemoteResult<f64> {
    TEMPERATURE_RE
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| RemoteError::format("temperature", output))
}

/// Parses `mpstat -P ALL 1 1` into per-core usage between 0 and 1.
///
/// The idle column is the last one; a comma decimal separator is accepted.
pub fn parse_cpu(output: &str) -> RemoteResult<Vec<f64>> {
    let plain = COLOR_RE.replace_all(output, "");
    plain
        .lines()
        .skip(MPSTAT_HEADER_LINES)
        .filter_map(|line| line.split_whitespace().last())
        .map(|idle| {
            idle.replace(',', ".")
                .parse::<f64>()
                .map(|value| 1.0 - value / 100.0)
                .map_err(|_| RemoteError::format("cpu", idle))
        })
        .collect()
}

/// Parses the `Mem:` line of `free` (KiB columns)
pub fn parse_memory(output: &str) -> RemoteResult<MemoryUsage> {
    let parts: Vec<&str> = output.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(RemoteError::format("memory", output));
    }
    let column = |i: usize| -> RemoteResult<u64> {
        parts[i]
            .parse()
            .map_err(|_| RemoteError::format("memory", output))
    };
    let total_kib = column(1)?;
    let free_kib = column(3)?;
    Ok(MemoryUsage {
        used_kib: total_kib.saturating_sub(free_kib),
        total_kib,
    })
}

/// Parses `uptime -s`, e.g. `2024-03-01 08:15:42`
pub fn parse_boot_time(output: &str) -> RemoteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(output.trim(), BOOT_TIME_FORMAT)
        .map_err(|_| RemoteError::format("uptime", output))
}

/// Parses `df`, summing used and total blocks of `/`-prefixed devices
pub fn parse_storage(output: &str) -> RemoteResult<StorageUsage> {
    let mut usage = StorageUsage::default();
    for line in output.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(RemoteError::format("storage", line));
        }
        if !parts[0].starts_with('/') {
            continue;
        }
        let size: u64 = parts[1]
            .parse()
            .map_err(|_| RemoteError::format("storage", line))?;
        let used: u64 = parts[2]
            .parse()
            .map_err(|_| RemoteError::format("storage", line))?;
        usage.total_kib += size;
        usage.used_kib += used;
    }
    Ok(usage)
}

/// Splits on whitespace into at most `n` fields, the last one keeping the
/// rest of the line
fn split_fields(line: &str, n: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim();
    while !rest.is_empty() {
        if fields.len() + 1 == n {
            fields.push(rest);
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((field, tail)) => {
                fields.push(field);
                rest = tail.trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}

/// Parses one data line of `ps -ely`
pub fn parse_process(line: &str) -> RemoteResult<ProcessEntry> {
    let fields = split_fields(line, PS_FIELDS);
    let [state, uid, pid, ppid, cpu, priority, nice, rss, size, wchan, tty, time, command] =
        fields[..]
    else {
        return Err(RemoteError::format("process entry", line));
    };

    let int = |value: &str| -> RemoteResult<u64> {
        value
            .parse()
            .map_err(|_| RemoteError::format("process entry", line))
    };
    let id = |value: &str| -> RemoteResult<u32> {
        value
            .parse()
            .map_err(|_| RemoteError::format("process entry", line))
    };

    Ok(ProcessEntry {
        state: state.to_string(),
        uid: id(uid)?,
        pid: id(pid)?,
        ppid: id(ppid)?,
        cpu: cpu.to_string(),
        priority: priority.to_string(),
        nice: nice.to_string(),
        rss: int(rss)?,
        size: int(size)?,
        wchan: wchan.to_string(),
        tty: tty.to_string(),
        time: time.to_string(),
        command: command.to_string(),
    })
}

/// Parses `ps -ely`, skipping the header line
pub fn parse_processes(output: &str) -> RemoteResult<Vec<ProcessEntry>> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(parse_process)
        .collect()
}

/// Parses `pidof`; `None` when nothing matched, the first pid otherwise
pub fn parse_pid(output: &str) -> RemoteResult<Option<u32>> {
    output
        .split_whitespace()
        .next()
        .map(|pid| pid.parse().map_err(|_| RemoteError::format("pid", output)))
        .transpose()
}

/// Parses `screen -ls`; lines that are not session lines are ignored
#[must_use]
pub fn parse_screens(output: &str) -> Vec<ScreenSession> {
    output
        .lines()
        .filter_map(|line| {
            let caps = SCREEN_RE.captures(line)?;
            let pid = caps["pid"].parse().ok()?;
            let start = NaiveDateTime::parse_from_str(&caps["start"], SCREEN_START_FORMAT)
                .ok()?
                .with_second(0)?;
            Some(ScreenSession::new(pid, &caps["name"], start, &caps["state"]))
        })
        .collect()
}
