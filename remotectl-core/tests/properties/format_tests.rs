//! Property tests for fact formatting

use chrono::TimeDelta;
use proptest::prelude::*;
use remotectl_core::remote::format::{format_cpu, format_memory, format_storage, format_uptime};
use remotectl_core::{MemoryUsage, StorageUsage};

fn percent_in(text: &str) -> f64 {
    let start = text.rfind('(').unwrap() + 1;
    let end = text.rfind("%)").unwrap();
    text[start..end].parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn uptime_recomposes(seconds in 0i64..(400 * 86_400)) {
        let text = format_uptime(TimeDelta::seconds(seconds));
        let (days, clock) = text.split_once("d ").unwrap();
        let parts: Vec<i64> = clock.split(':').map(|p| p.parse().unwrap()).collect();

        prop_assert_eq!(clock.len(), 8);
        prop_assert!(parts[0] < 24 && parts[1] < 60 && parts[2] < 60);
        let total = days.parse::<i64>().unwrap() * 86_400 + parts[0] * 3600 + parts[1] * 60 + parts[2];
        prop_assert_eq!(total, seconds);
    }

    #[test]
    fn cpu_lists_every_core_then_average(usage in prop::collection::vec(0.0f64..=1.0, 1..16)) {
        let text = format_cpu(&usage);
        let fields: Vec<&str> = text.split("  ").collect();

        prop_assert_eq!(fields.len(), usage.len() + 1);
        prop_assert!(fields[..usage.len()].iter().all(|f| f.ends_with('%')));
        let average = percent_in(&text);
        prop_assert!((0.0..=100.0).contains(&average));
    }

    #[test]
    fn storage_percent_never_exceeds_100(used in 0u64..10_000_000_000, total in 0u64..10_000_000_000) {
        let text = format_storage(StorageUsage { used_kib: used, total_kib: total });
        let percent = percent_in(&text);
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn memory_percent_in_range(total in 1u64..100_000_000, free_share in 0.0f64..=1.0) {
        let used = (total as f64 * (1.0 - free_share)) as u64;
        let text = format_memory(MemoryUsage { used_kib: used.min(total), total_kib: total });
        let percent = percent_in(&text);
        prop_assert!((0.0..=100.0).contains(&percent));
        prop_assert!(text.contains("MB / "));
    }
}
