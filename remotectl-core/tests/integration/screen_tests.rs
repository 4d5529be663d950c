//! Screen session lifecycle against the scripted host

use remotectl_core::testing::reply_with;
use remotectl_core::{ExecOutput, RemoteError, ScreenIdentifier};

use super::support::connected_client;

#[tokio::test]
async fn list_empty_host() {
    let (client, _, _) = connected_client().await;
    assert!(client.screens().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_list_resolve() {
    let (client, connector, host) = connected_client().await;
    let screens = client.screens();

    screens.create("sleep 100", "web").await.unwrap();
    assert!(
        connector
            .commands()
            .contains(&"screen -dmS web bash -c 'sleep 100'".to_string())
    );
    assert_eq!(host.screen_names(), ["web"]);

    let listed = screens.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    let web = &listed[0];
    assert_eq!(web.name, "web");
    assert_eq!(web.state, "Detached");

    assert_eq!(&screens.resolve(web.pid).await.unwrap(), web);
    assert_eq!(&screens.resolve("web").await.unwrap(), web);
    assert_eq!(&screens.resolve(web.to_string()).await.unwrap(), web);
    assert_eq!(&screens.resolve(web).await.unwrap(), web);
}

#[tokio::test]
async fn create_with_existing_name_collides() {
    let (client, connector, host) = connected_client().await;
    let screens = client.screens();
    screens.create("sleep 100", "web").await.unwrap();

    let err = screens.create("sleep 200", "web").await.unwrap_err();
    assert!(matches!(err, RemoteError::NameCollision(ref name) if name == "web"));

    let spawned = connector
        .commands()
        .iter()
        .filter(|c| c.starts_with("screen -dmS"))
        .count();
    assert_eq!(spawned, 1);
    assert_eq!(host.screen_names(), ["web"]);
}

#[tokio::test]
async fn kill_then_resolve_is_lookup_error() {
    let (client, _, _) = connected_client().await;
    let screens = client.screens();
    screens.create("sleep 100", "web").await.unwrap();
    let web = screens.resolve("web").await.unwrap();

    assert!(screens.kill(&web).await.unwrap());
    assert!(matches!(
        screens.resolve(&web).await,
        Err(RemoteError::Lookup(_))
    ));
}

#[tokio::test]
async fn kill_dead_session_is_lookup_error() {
    let (client, _, _) = connected_client().await;
    let screens = client.screens();
    screens.create("sleep 100", "web").await.unwrap();
    let web = screens.resolve("web").await.unwrap();
    screens.kill(web.pid).await.unwrap();

    let err = screens.kill(web).await.unwrap_err();
    assert!(matches!(err, RemoteError::Lookup(_)));
    assert!(!err.is_connection_failure());
}

#[tokio::test]
async fn kill_reports_screen_failure_as_false() {
    let (client, connector, host) = connected_client().await;
    host.add_screen(100, "stuck");
    connector.script("screen -X -S 100.stuck quit", reply_with("", "", 1));

    assert!(!client.screens().kill("stuck").await.unwrap());
    assert_eq!(host.screen_names(), ["stuck"]);
}

#[tokio::test]
async fn kill_without_exit_status_reports_false() {
    let (client, connector, host) = connected_client().await;
    host.add_screen(100, "stuck");
    connector.script(
        "screen -X -S 100.stuck quit",
        ExecOutput {
            exit_status: None,
            ..ExecOutput::default()
        },
    );

    assert!(!client.screens().kill("stuck").await.unwrap());
    assert!(!client.kill_by_pid(100).await.unwrap());
    assert!(client.session().connected());
}

#[tokio::test]
async fn rename_session() {
    let (client, connector, host) = connected_client().await;
    let screens = client.screens();
    host.add_screen(300, "old");

    screens.rename(ScreenIdentifier::ById(300), "new").await.unwrap();
    assert!(
        connector
            .commands()
            .contains(&"screen -S 300.old -X sessionname new".to_string())
    );
    assert_eq!(screens.resolve("new").await.unwrap().pid, 300);
    assert!(matches!(
        screens.resolve("old").await,
        Err(RemoteError::Lookup(_))
    ));
}

#[tokio::test]
async fn rename_unknown_session() {
    let (client, _, _) = connected_client().await;
    let err = client.screens().rename("ghost", "new").await.unwrap_err();
    assert!(matches!(err, RemoteError::Lookup(_)));
}
