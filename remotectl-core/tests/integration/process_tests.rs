//! Process lookup, kill and reboot

use remotectl_core::testing::reply_with;
use remotectl_core::{ExecOutput, RemoteError, TransportError};

use super::support::connected_client;

#[tokio::test]
async fn pid_lookup() {
    let (client, _, _) = connected_client().await;
    assert_eq!(client.pid("sshd").await.unwrap(), Some(612));
    assert_eq!(client.pid("nginx").await.unwrap(), None);
}

#[tokio::test]
async fn kill_by_name() {
    let (client, connector, host) = connected_client().await;
    host.add_process(4242, "python3");

    assert!(client.kill_by_name("python3").await.unwrap());
    assert_eq!(connector.count("kill -9 4242"), 1);
    assert_eq!(client.pid("python3").await.unwrap(), None);
}

#[tokio::test]
async fn kill_by_name_unknown() {
    let (client, connector, _) = connected_client().await;
    let err = client.kill_by_name("nginx").await.unwrap_err();
    assert!(matches!(err, RemoteError::Lookup(_)));
    assert!(!connector.commands().iter().any(|c| c.starts_with("kill")));
}

#[tokio::test]
async fn kill_by_pid_of_screen_quits_screen() {
    let (client, connector, host) = connected_client().await;
    host.add_screen(2500, "backup");

    assert!(client.kill_by_pid(2500).await.unwrap());
    assert_eq!(connector.count("screen -X -S 2500.backup quit"), 1);
    assert_eq!(connector.count("kill -9 2500"), 0);
}

#[tokio::test]
async fn kill_by_pid_of_missing_process() {
    let (client, _, _) = connected_client().await;
    let err = client.kill_by_pid(9999).await.unwrap_err();
    assert!(matches!(err, RemoteError::ExitCode(1)));
}

#[tokio::test]
async fn kill_by_pid_survivor_reports_false() {
    let (client, connector, host) = connected_client().await;
    host.add_process(700, "init-helper");
    connector.script("kill -9 700", reply_with("", "", 0));

    assert!(!client.kill_by_pid(700).await.unwrap());
}

#[tokio::test]
async fn reboot_success() {
    let (client, connector, _) = connected_client().await;
    connector.script("sudo reboot", reply_with("", "", 0));
    client.reboot().await.unwrap();
}

#[tokio::test]
async fn reboot_tolerates_dropped_connection() {
    let (client, connector, _) = connected_client().await;
    connector.script(
        "sudo reboot",
        ExecOutput {
            exit_status: None,
            ..ExecOutput::default()
        },
    );
    client.reboot().await.unwrap();

    connector.fail_next(TransportError::Disconnected("host going down".into()));
    client.reboot().await.unwrap();
    assert!(!client.session().connected());
}

#[tokio::test]
async fn reboot_denied() {
    let (client, connector, _) = connected_client().await;
    connector.script(
        "sudo reboot",
        reply_with("", "sudo: a password is required\n", 1),
    );
    assert!(matches!(client.reboot().await, Err(RemoteError::ExitCode(1))));
}
