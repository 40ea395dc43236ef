mod common;

use std::sync::Arc;

use common::{MockNetwork, config};
use haven::{CacheStorage, Lifecycle, Registration, WorkerError, WorkerState};
use haven_backend::Storage;
use haven_core::ResponseSource;
use haven_http::{FetchHandler, FetchRequest, fetch_shell};
use haven_moka::MokaStorage;
use pretty_assertions::assert_eq;

fn shell_network() -> MockNetwork {
    config("v1")
        .shell_urls()
        .iter()
        .fold(MockNetwork::online(), |network, url| network.route(url, 200, url))
}

#[tokio::test]
async fn shell_is_fetched_in_order() {
    let config = config("v1");
    let network = shell_network();
    let mut net = network.clone();

    let entries = fetch_shell("v1", &config.shell_urls(), &mut net).await.unwrap();
    let urls: Vec<String> = entries.iter().map(|(key, _)| key.url().to_owned()).collect();
    assert_eq!(urls, config.shell_urls());
    assert_eq!(network.calls().len(), config.shell_urls().len());
}

#[tokio::test]
async fn missing_shell_file_aborts_install() {
    let config = config("v1");
    let urls = config.shell_urls();
    let broken = urls.last().unwrap().clone();
    // unknown URLs answer 404
    let mut network = urls[..urls.len() - 1]
        .iter()
        .fold(MockNetwork::online(), |network, url| network.route(url, 200, url));

    let storage = Arc::new(MokaStorage::new());
    let registration = Arc::new(Registration::new());
    let lifecycle = Lifecycle::new(
        "v1",
        registration.clone(),
        CacheStorage::new(storage.clone(), config.partitions()),
    );

    let error = lifecycle
        .install(fetch_shell("v1", &urls, &mut network))
        .await
        .unwrap_err();
    match error {
        WorkerError::InstallFailed { version, reason } => {
            assert_eq!(version, "v1");
            assert!(reason.contains(&broken), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(lifecycle.state(), WorkerState::Redundant);
    assert_eq!(registration.active(), None);
    assert!(storage.partition("tasks-static-v1").await.unwrap().is_none());
}

#[tokio::test]
async fn offline_install_fails() {
    let config = config("v1");
    let mut network = MockNetwork::offline();

    let error = fetch_shell("v1", &config.shell_urls(), &mut network)
        .await
        .unwrap_err();
    assert!(matches!(error, WorkerError::InstallFailed { .. }));
    assert_eq!(network.calls().len(), 1);
}

#[tokio::test]
async fn successful_install_populates_static_partition() {
    let config = config("v1");
    let mut network = shell_network();
    let storage = Arc::new(MokaStorage::new());
    let lifecycle = Lifecycle::new(
        "v1",
        Arc::new(Registration::new()),
        CacheStorage::new(storage.clone(), config.partitions()),
    );

    let state = lifecycle
        .install(fetch_shell("v1", &config.shell_urls(), &mut network))
        .await
        .unwrap();
    assert_eq!(state, WorkerState::Active);

    network.set_online(false);
    let handler = FetchHandler::from_config(&config, lifecycle.storage().clone()).unwrap();
    let manifest = handler
        .fetch(FetchRequest::get("https://app.example/manifest.json").unwrap(), &mut network)
        .await
        .unwrap();
    assert_eq!(manifest.source, ResponseSource::Cache("tasks-static-v1".into()));
    assert_eq!(common::body(&manifest), "https://app.example/manifest.json");
}
