//! Remote facts read through `Client`

use remotectl_core::RemoteError;
use remotectl_core::testing::{reply, reply_with};

use super::support::connected_client;

#[tokio::test]
async fn temperature_and_format() {
    let (client, _, _) = connected_client().await;
    assert!((client.temperature().await.unwrap() - 48.3).abs() < 1e-9);
    assert_eq!(client.fmt_temperature().await.unwrap(), "48.3°C");
}

#[tokio::test]
async fn temperature_format_error() {
    let (client, connector, _) = connected_client().await;
    connector.script(
        "vcgencmd measure_temp",
        reply("VCHI initialization failed\n"),
    );

    let err = client.temperature().await.unwrap_err();
    assert!(matches!(err, RemoteError::Format { ref field, .. } if field == "temperature"));
}

#[tokio::test]
async fn temperature_wrong_exit_code() {
    let (client, connector, _) = connected_client().await;
    connector.script(
        "vcgencmd measure_temp",
        reply_with("", "vcgencmd: not found\n", 127),
    );

    assert!(matches!(
        client.temperature().await,
        Err(RemoteError::ExitCode(127))
    ));
}

#[tokio::test]
async fn cpu_per_core() {
    let (client, _, _) = connected_client().await;
    let cpu = client.cpu().await.unwrap();
    assert_eq!(cpu.len(), 4);
    assert_eq!(
        client.fmt_cpu().await.unwrap(),
        "25.00%  0.00%  50.00%  100.00%  (43.75%)"
    );
}

#[tokio::test]
async fn memory_and_storage() {
    let (client, _, _) = connected_client().await;

    let memory = client.memory().await.unwrap();
    assert_eq!((memory.used_kib, memory.total_kib), (7_400_000, 12_800_000));
    assert_eq!(
        client.fmt_memory().await.unwrap(),
        "7227MB / 12500MB (57.81%)"
    );

    let storage = client.storage().await.unwrap();
    assert_eq!((storage.used_kib, storage.total_kib), (6_000_000, 30_000_000));
    assert_eq!(
        client.fmt_storage().await.unwrap(),
        "6.00GB / 30.00GB (20.00%)"
    );
}

#[tokio::test]
async fn processes_listed() {
    let (client, _, host) = connected_client().await;
    host.add_process(4242, "python3 -m http.server");

    let processes = client.processes().await.unwrap();
    assert!(processes.iter().any(|p| p.pid == 1 && p.command == "systemd"));
    let server = processes.iter().find(|p| p.pid == 4242).unwrap();
    assert_eq!(server.command, "python3 -m http.server");
}

#[tokio::test]
async fn boot_time_cached_per_generation() {
    let (client, connector, _) = connected_client().await;

    let first = client.boot_time().await.unwrap();
    let second = client.boot_time().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(connector.count("uptime -s"), 1);

    client.session().reconnect().await.unwrap();
    client.boot_time().await.unwrap();
    assert_eq!(connector.count("uptime -s"), 2);

    client.reconnect().await.unwrap();
    client.fmt_uptime().await.unwrap();
    assert_eq!(connector.count("uptime -s"), 3);
}

#[tokio::test]
async fn boot_time_requires_connection() {
    let (client, connector, _) = connected_client().await;
    client.session().close().await;

    let err = client.boot_time().await.unwrap_err();
    assert!(matches!(err, RemoteError::NotConnected));
    assert_eq!(connector.count("uptime -s"), 0);
}

#[tokio::test]
async fn uptime_format() {
    let (client, _, _) = connected_client().await;
    let uptime = client.fmt_uptime().await.unwrap();

    let (days, clock) = uptime.split_once("d ").unwrap();
    assert!(days.parse::<u64>().unwrap() > 0);
    assert_eq!(clock.len(), 8);
}

#[tokio::test]
async fn info_report() {
    let (client, _, _) = connected_client().await;
    let info = client.info().await.unwrap();

    assert_eq!(info.hostname, "pi.local");
    assert_eq!(info.port, 22);
    assert_eq!(info.temperature, "48.3°C");

    let report = info.to_string();
    let labels: Vec<&str> = report
        .lines()
        .map(|line| line.split(" : ").next().unwrap().trim_end())
        .collect();
    assert_eq!(
        labels,
        ["hostname", "port", "temperature", "cpu", "memory", "uptime", "storage"]
    );
}

#[tokio::test]
async fn facts_fail_when_not_connected() {
    let (client, connector, _) = connected_client().await;
    client.session().close().await;
    let before = connector.commands().len();

    assert!(matches!(client.memory().await, Err(RemoteError::NotConnected)));
    assert!(matches!(client.info().await, Err(RemoteError::NotConnected)));
    assert_eq!(connector.commands().len(), before);
}
