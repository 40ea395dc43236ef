use std::sync::Arc;

use haven::{CacheStorage, PartitionNames};
use haven_backend::{Backend, Storage};
use haven_core::RequestKey;
use haven_moka::MokaStorage;
use pretty_assertions::assert_eq;

fn store(version: &str, storage: Arc<MokaStorage>) -> CacheStorage {
    CacheStorage::new(storage, PartitionNames::new("tasks", version))
}

fn key(path: &str) -> RequestKey {
    RequestKey::get(format!("https://app.example{path}"))
}

#[tokio::test]
async fn put_then_lookup_in_any_partition() {
    let cache = store("v1", Arc::new(MokaStorage::new()));
    let dynamic = cache.partitions().dynamic_name().to_owned();

    assert!(cache.put(&dynamic, &key("/api/tasks"), &"[1,2]".to_owned()).await);

    let hit = cache.lookup::<String>(&key("/api/tasks")).await.unwrap();
    assert_eq!(hit.entry.data(), "[1,2]");
    assert_eq!(hit.partition, "tasks-dynamic-v1");
}

#[tokio::test]
async fn lookup_prefers_newest_partition() {
    let cache = store("v2", Arc::new(MokaStorage::new()));
    cache.put("tasks-dynamic-v1", &key("/"), &"old".to_owned()).await;
    cache.put("tasks-dynamic-v2", &key("/"), &"new".to_owned()).await;

    let hit = cache.lookup::<String>(&key("/")).await.unwrap();
    assert_eq!(hit.entry.into_inner(), "new");

    let scoped = cache
        .lookup_in::<String>("tasks-dynamic-v1", &key("/"))
        .await
        .unwrap();
    assert_eq!(scoped.entry.into_inner(), "old");
}

#[tokio::test]
async fn non_get_is_never_written_or_read() {
    let cache = store("v1", Arc::new(MokaStorage::new()));
    let post = RequestKey::new("POST", "https://app.example/api/tasks");

    assert!(!cache.put("tasks-dynamic-v1", &post, &"body".to_owned()).await);
    assert!(cache.lookup::<String>(&post).await.is_none());
    assert!(cache.names().await.unwrap().is_empty());
}

#[tokio::test]
async fn lookup_in_missing_partition_does_not_create_it() {
    let storage = Arc::new(MokaStorage::new());
    let cache = store("v1", storage.clone());
    assert!(cache.lookup_in::<String>("tasks-static-v1", &key("/")).await.is_none());
    assert!(storage.names().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_stale_keeps_current_partitions_intact() {
    let storage = Arc::new(MokaStorage::new());
    let old = store("v1", storage.clone());
    old.put("tasks-static-v1", &key("/"), &"shell v1".to_owned()).await;
    old.put("tasks-dynamic-v1", &key("/api/tasks"), &"tasks v1".to_owned()).await;

    let current = store("v2", storage.clone());
    current.put("tasks-static-v2", &key("/"), &"shell v2".to_owned()).await;
    current.put("tasks-dynamic-v2", &key("/api/tasks"), &"tasks v2".to_owned()).await;

    let mut deleted = current
        .delete_stale(&current.partitions().current())
        .await
        .unwrap();
    deleted.sort();
    assert_eq!(deleted, vec!["tasks-dynamic-v1", "tasks-static-v1"]);

    let mut names = storage.names().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["tasks-dynamic-v2", "tasks-static-v2"]);
    let hit = current.lookup::<String>(&key("/api/tasks")).await.unwrap();
    assert_eq!(hit.entry.into_inner(), "tasks v2");
}

#[tokio::test]
async fn overwrite_keeps_one_entry() {
    let storage = Arc::new(MokaStorage::new());
    let cache = store("v1", storage.clone());
    cache.put("tasks-dynamic-v1", &key("/api/tasks"), &"first".to_owned()).await;
    cache.put("tasks-dynamic-v1", &key("/api/tasks"), &"second".to_owned()).await;

    let partition = storage.partition("tasks-dynamic-v1").await.unwrap().unwrap();
    assert_eq!(partition.keys().await.unwrap().len(), 1);
    let hit = cache.lookup::<String>(&key("/api/tasks")).await.unwrap();
    assert_eq!(hit.entry.into_inner(), "second");
}

#[tokio::test]
async fn shell_survives_runtime_writes_to_a_bounded_partition() {
    let storage = Arc::new(MokaStorage::builder().max_entries(10).build());
    let cache = store("v1", storage);
    let shell = cache.partitions().static_name().to_owned();
    cache
        .commit(&shell, &[(key("/index.html"), "shell".to_owned())])
        .await
        .unwrap();

    let mut stored = 0;
    for i in 0..2_050 {
        if cache.put(&shell, &key(&format!("/assets/{i}.js")), &"asset".to_owned()).await {
            stored += 1;
        }
    }

    assert_eq!(stored, 9);
    let hit = cache.lookup::<String>(&key("/index.html")).await.unwrap();
    assert_eq!(hit.entry.into_inner(), "shell");
}
