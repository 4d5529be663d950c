//! Scripted remote host shared by the integration tests
//!
//! Answers the diagnostic commands with canned output and simulates a
//! process table and `screen` sessions that change as commands run.

use std::sync::{Arc, Mutex};

use remotectl_core::testing::{FakeConnector, reply, reply_with};
use remotectl_core::{Client, ExecOutput, Session, SessionParams, TransportError};

pub const MPSTAT: &str = "\
Linux 6.1.21-v8+ (pi) \t03/01/2024 \t_aarch64_\t(4 CPU)

08:15:01 AM  CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
08:15:02 AM  all    1.00    0.00    0.50    0.00    0.00    0.00    0.00    0.00    0.00   98.50
08:15:02 AM    0    2.00    0.00    1.00    0.00    0.00    0.00    0.00    0.00    0.00   97.00
08:15:02 AM    1    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00  100.00
08:15:02 AM    2    1.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00   99.00
08:15:02 AM    3    1.00    0.00    1.00    0.00    0.00    0.00    0.00    0.00    0.00   98.00

Average:     CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
Average:     all    1.00    0.00    0.50    0.00    0.00    0.00    0.00    0.00    0.00   98.50
Average:       0    2.00    0.00    1.00    0.00    0.00    0.00    0.00    0.00    0.00   75.00
Average:       1    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00  100.00
Average:       2    1.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00   50.00
Average:       3    1.00    0.00    1.00    0.00    0.00    0.00    0.00    0.00    0.00    0.00
";

pub const FREE: &str =
    "Mem:        12800000     5000000     5400000      100000     2000000     7000000\n";

pub const DF: &str = "\
Filesystem     1K-blocks    Used Available Use% Mounted on
/dev/root       30000000 6000000  22000000  22% /
tmpfs             900000    1000    899000   1% /dev/shm
";

pub const PS_HEADER: &str =
    "S   UID     PID    PPID  C PRI  NI   RSS    SZ WCHAN  TTY          TIME CMD";

#[derive(Debug, Default)]
struct HostState {
    /// (pid, name) of running screen sessions
    screens: Vec<(u32, String)>,
    /// (pid, command) of other processes
    processes: Vec<(u32, String)>,
    next_pid: u32,
}

/// Stateful fake host installed as the connector's responder
#[derive(Clone)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn install(connector: &FakeConnector) -> Self {
        let host = Self {
            state: Arc::new(Mutex::new(HostState {
                screens: Vec::new(),
                processes: vec![(1, "systemd".into()), (612, "sshd".into())],
                next_pid: 2000,
            })),
        };
        connector.script("vcgencmd measure_temp", reply("temp=48.3'C\n"));
        connector.script("mpstat -P ALL 1 1", reply(MPSTAT));
        connector.script("free | grep 'Mem:'", reply(FREE));
        connector.script("df", reply(DF));
        connector.script("uptime -s", reply("2024-03-01 08:15:42\n"));

        let responder = host.clone();
        connector.set_responder(move |command| responder.respond(command));
        host
    }

    pub fn add_process(&self, pid: u32, command: &str) {
        self.state
            .lock()
            .unwrap()
            .processes
            .push((pid, command.to_string()));
    }

    pub fn add_screen(&self, pid: u32, name: &str) {
        self.state.lock().unwrap().screens.push((pid, name.to_string()));
    }

    pub fn screen_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .screens
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    fn respond(&self, command: &str) -> Result<ExecOutput, TransportError> {
        let mut state = self.state.lock().unwrap();
        let words: Vec<&str> = command.split_whitespace().collect();
        let output = match words.as_slice() {
            [] => reply(""),
            ["screen", "-ls"] => screen_listing(&state.screens),
            ["screen", "-dmS", name, "bash", "-c", ..] => {
                let pid = state.next_pid;
                state.next_pid += 1;
                state.screens.push((pid, (*name).to_string()));
                reply("")
            }
            ["screen", "-X", "-S", target, "quit"] => {
                let before = state.screens.len();
                state
                    .screens
                    .retain(|(pid, name)| format!("{pid}.{name}") != *target);
                if state.screens.len() < before {
                    reply("")
                } else {
                    reply_with("No screen session found.\n", "", 1)
                }
            }
            ["screen", "-S", target, "-X", "sessionname", new_name] => {
                match state
                    .screens
                    .iter_mut()
                    .find(|(pid, name)| format!("{pid}.{name}") == *target)
                {
                    Some(session) => {
                        session.1 = (*new_name).to_string();
                        reply("")
                    }
                    None => reply_with("No screen session found.\n", "", 1),
                }
            }
            ["ps", "-ely"] => ps_listing(&state),
            ["pidof", name] => {
                let pids: Vec<String> = state
                    .processes
                    .iter()
                    .filter(|(_, cmd)| cmd.as_str() == *name)
                    .map(|(pid, _)| pid.to_string())
                    .collect();
                if pids.is_empty() {
                    reply_with("", "", 1)
                } else {
                    reply(&format!("{}\n", pids.join(" ")))
                }
            }
            ["kill", "-9", pid] => {
                let pid: u32 = pid.parse().unwrap();
                let before = state.processes.len();
                state.processes.retain(|(p, _)| *p != pid);
                if state.processes.len() < before {
                    reply("")
                } else {
                    reply_with("", "kill: No such process\n", 1)
                }
            }
            _ => reply_with("", &format!("bash: {command}: command not found\n"), 127),
        };
        Ok(output)
    }
}

fn screen_listing(screens: &[(u32, String)]) -> ExecOutput {
    if screens.is_empty() {
        return reply_with("No Sockets found in /run/screen/S-pi.\n", "", 1);
    }
    let mut out = String::from("There are screens on:\n");
    for (pid, name) in screens {
        out.push_str(&format!("\t{pid}.{name}\t(01/03/2024 08:15:42)\t(Detached)\n"));
    }
    out.push_str(&format!("{} Sockets in /run/screen/S-pi.\n", screens.len()));
    reply_with(&out, "", 1)
}

fn ps_listing(state: &HostState) -> ExecOutput {
    let mut out = format!("{PS_HEADER}\n");
    let screens = state.screens.iter().map(|(pid, _)| (*pid, "screen".to_string()));
    for (pid, command) in state.processes.iter().cloned().chain(screens) {
        out.push_str(&format!(
            "S  1000 {pid:>7}       1  0  80   0  4412  2117 do_wai ?        00:00:00 {command}\n"
        ));
    }
    reply(&out)
}

/// Connected client on a fresh fake host
pub async fn connected_client() -> (Client, Arc<FakeConnector>, FakeHost) {
    let connector = FakeConnector::new();
    let host = FakeHost::install(&connector);
    let session = Session::with_params(
        connector.clone(),
        SessionParams::new("pi.local").with_username("pi"),
    );
    session.reconnect().await.unwrap();
    (Client::new(Arc::new(session)), connector, host)
}
