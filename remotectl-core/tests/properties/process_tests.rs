//! Property tests for `ps -ely` parsing

use std::collections::HashSet;

use proptest::prelude::*;
use remotectl_core::ProcessEntry;
use remotectl_core::remote::parser::{parse_process, parse_processes};

fn ps_line(pid: u32, command: &str) -> String {
    format!("S  1000 {pid:>7}       1  0  80   0  4412  2117 do_wai ?        00:00:00 {command}")
}

fn arb_command() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.-]{0,10}( -{0,2}[a-z0-9=/]{1,8}){0,4}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn command_keeps_the_rest_of_the_line(pid in 1u32..4_000_000, command in arb_command()) {
        let entry = parse_process(&ps_line(pid, &command)).unwrap();
        prop_assert_eq!(entry.pid, pid);
        prop_assert_eq!(entry.command, command);
        prop_assert_eq!(entry.rss, 4412);
    }

    #[test]
    fn set_deduplicates_by_pid(
        pids in prop::collection::vec(1u32..50, 1..40),
        command in arb_command(),
    ) {
        let mut listing = String::from("S   UID     PID    PPID  C PRI  NI   RSS    SZ WCHAN  TTY          TIME CMD\n");
        for (i, pid) in pids.iter().enumerate() {
            listing.push_str(&ps_line(*pid, &format!("{command}{i}")));
            listing.push('\n');
        }

        let entries = parse_processes(&listing).unwrap();
        prop_assert_eq!(entries.len(), pids.len());

        let unique: HashSet<ProcessEntry> = entries.into_iter().collect();
        let expected: HashSet<u32> = pids.into_iter().collect();
        prop_assert_eq!(unique.len(), expected.len());
        prop_assert!(unique.iter().all(|entry| expected.contains(&entry.pid)));
    }

    #[test]
    fn short_lines_are_rejected(fields in 1usize..13) {
        let line: Vec<String> = (0..fields).map(|i| i.to_string()).collect();
        prop_assert!(parse_process(&line.join(" ")).is_err());
    }
}
