mod common;

use std::sync::Arc;

use common::{init_tracing, shell_entry};
use haven::{
    CacheStorage, Lifecycle, Registration, WorkerConfig, WorkerError, WorkerMessage, WorkerState,
};
use haven_backend::Storage;
use haven_core::RequestKey;
use haven_moka::MokaStorage;
use pretty_assertions::assert_eq;

fn config(version: &str) -> WorkerConfig {
    WorkerConfig {
        version: version.into(),
        cache_prefix: "tasks".into(),
        origin: "https://app.example".into(),
        ..WorkerConfig::default()
    }
}

fn lifecycle(version: &str, registration: &Arc<Registration>, storage: &Arc<MokaStorage>) -> Lifecycle {
    let cache = CacheStorage::new(storage.clone(), config(version).partitions());
    Lifecycle::new(version, registration.clone(), cache)
}

async fn shell() -> Result<Vec<(RequestKey, String)>, WorkerError> {
    Ok(vec![shell_entry("/"), shell_entry("/manifest.json")])
}

#[tokio::test]
async fn first_install_activates_immediately() {
    init_tracing();
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());
    let mut messages = registration.subscribe();

    let v1 = lifecycle("v1", &registration, &storage);
    assert_eq!(v1.state(), WorkerState::Parsed);
    assert_eq!(v1.install(shell()).await.unwrap(), WorkerState::Active);

    assert_eq!(registration.active().as_deref(), Some("v1"));
    assert_eq!(registration.waiting(), None);
    assert_eq!(
        messages.recv().await.unwrap(),
        WorkerMessage::Activated { version: "v1".into() }
    );

    let hit = v1
        .storage()
        .lookup_in::<String>("tasks-static-v1", &RequestKey::get("https://app.example/manifest.json"))
        .await
        .unwrap();
    assert_eq!(hit.entry.into_inner(), "contents of /manifest.json");
}

#[tokio::test]
async fn update_waits_until_skip_waiting() {
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());

    let v1 = lifecycle("v1", &registration, &storage);
    v1.install(shell()).await.unwrap();
    v1.storage()
        .put("tasks-dynamic-v1", &RequestKey::get("https://app.example/api/tasks"), &"[]".to_owned())
        .await;

    let mut messages = registration.subscribe();
    let v2 = lifecycle("v2", &registration, &storage);
    assert_eq!(v2.install(shell()).await.unwrap(), WorkerState::Installed);
    assert_eq!(
        messages.recv().await.unwrap(),
        WorkerMessage::UpdateAvailable { version: "v2".into() }
    );
    assert_eq!(registration.waiting().as_deref(), Some("v2"));
    assert_eq!(v1.state(), WorkerState::Active);

    // old partitions stay while v1 still controls the pages
    let mut names = storage.names().await.unwrap();
    names.sort();
    assert_eq!(
        names,
        vec!["tasks-dynamic-v1", "tasks-static-v1", "tasks-static-v2"]
    );

    assert!(v2.skip_waiting().await.unwrap());
    assert_eq!(v2.state(), WorkerState::Active);
    assert_eq!(v1.state(), WorkerState::Redundant);
    assert_eq!(registration.active().as_deref(), Some("v2"));
    assert_eq!(storage.names().await.unwrap(), vec!["tasks-static-v2"]);
    assert_eq!(
        messages.recv().await.unwrap(),
        WorkerMessage::Activated { version: "v2".into() }
    );
}

#[tokio::test]
async fn skip_waiting_is_a_no_op_unless_waiting() {
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());
    let v1 = lifecycle("v1", &registration, &storage);
    assert!(!v1.skip_waiting().await.unwrap());
    v1.install(shell()).await.unwrap();
    assert!(!v1.skip_waiting().await.unwrap());
}

#[tokio::test]
async fn failed_install_commits_nothing() {
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());
    let v1 = lifecycle("v1", &registration, &storage);

    let failing = async {
        Err::<Vec<(RequestKey, String)>, _>(WorkerError::InstallFailed {
            version: "v1".into(),
            reason: "https://app.example/manifest.json returned 404".into(),
        })
    };
    let error = v1.install(failing).await.unwrap_err();

    assert!(matches!(error, WorkerError::InstallFailed { .. }));
    assert_eq!(v1.state(), WorkerState::Redundant);
    assert_eq!(registration.installing(), None);
    assert_eq!(registration.active(), None);
    assert!(storage.names().await.unwrap().is_empty());
}

#[tokio::test]
async fn install_twice_is_rejected() {
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());
    let v1 = lifecycle("v1", &registration, &storage);
    v1.install(shell()).await.unwrap();

    let error = v1.install(shell()).await.unwrap_err();
    assert!(matches!(
        error,
        WorkerError::InvalidTransition {
            from: WorkerState::Active,
            to: WorkerState::Installing,
            ..
        }
    ));
}

#[tokio::test]
async fn newer_waiting_version_replaces_older_one() {
    let registration = Arc::new(Registration::new());
    let storage = Arc::new(MokaStorage::new());
    lifecycle("v1", &registration, &storage).install(shell()).await.unwrap();

    let v2 = lifecycle("v2", &registration, &storage);
    v2.install(shell()).await.unwrap();
    let v3 = lifecycle("v3", &registration, &storage);
    v3.install(shell()).await.unwrap();

    assert_eq!(v2.state(), WorkerState::Redundant);
    assert_eq!(registration.waiting().as_deref(), Some("v3"));
    assert!(matches!(
        v2.activate().await,
        Err(WorkerError::InvalidTransition { .. })
    ));
}
