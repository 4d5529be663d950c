//! File transfer over the SFTP sub-channel

use remotectl_core::RemoteError;

use super::support::connected_client;

#[tokio::test]
async fn upload_then_download() {
    let (client, connector, _) = connected_client().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("report.txt");
    std::fs::write(&local, b"cpu ok\n").unwrap();

    client.upload(&local, "/home/pi/report.txt").await.unwrap();
    assert_eq!(
        connector.file("/home/pi/report.txt").as_deref(),
        Some(&b"cpu ok\n"[..])
    );

    let copy = dir.path().join("copy.txt");
    client.download("/home/pi/report.txt", &copy).await.unwrap();
    assert_eq!(std::fs::read(&copy).unwrap(), b"cpu ok\n");

    assert_eq!(connector.file_channels(), (2, 2));
}

#[tokio::test]
async fn failed_download_releases_channel() {
    let (client, connector, _) = connected_client().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("missing.txt");

    let err = client.download("/nope", &local).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transfer(ref msg) if msg.contains("/nope")));
    assert!(!local.exists());
    assert_eq!(connector.file_channels(), (1, 1));
}

#[tokio::test]
async fn upload_of_missing_local_file() {
    let (client, connector, _) = connected_client().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .upload(&dir.path().join("absent"), "/tmp/absent")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Io(_)));
    assert_eq!(connector.file_channels(), (0, 0));
}

#[tokio::test]
async fn transfer_requires_connection() {
    let (client, connector, _) = connected_client().await;
    connector.put_file("/etc/hostname", "pi\n");
    client.session().close().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .download("/etc/hostname", &dir.path().join("hostname"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotConnected));
    assert_eq!(connector.file_channels(), (0, 0));
}
