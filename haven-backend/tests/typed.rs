mod common;

use std::sync::Arc;

use common::{ErrorBackend, TestBackend};
use haven_backend::{Backend, BackendError, CacheBackend, DeleteStatus, ValueFormat};
use haven_core::{CachedEntry, RequestKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    id: u32,
    title: String,
}

fn task() -> Task {
    Task {
        id: 7,
        title: "buy milk".into(),
    }
}

#[tokio::test]
async fn typed_set_then_get_keeps_write_time() {
    let backend = TestBackend::new(ValueFormat::Json);
    let key = RequestKey::get("https://app.example/api/tasks/7");
    let entry = CachedEntry::new(task());

    backend.set(&key, &entry).await.unwrap();
    let restored = backend.get::<Task>(&key).await.unwrap().unwrap();

    assert_eq!(restored.data(), &task());
    assert_eq!(restored.stored_at(), entry.stored_at());
}

#[tokio::test]
async fn json_partition_stores_readable_bytes() {
    let backend = TestBackend::new(ValueFormat::Json);
    let key = RequestKey::get("https://app.example/api/tasks/7");
    backend.set(&key, &CachedEntry::new(task())).await.unwrap();

    let raw = backend.get_raw(&key).unwrap();
    assert_eq!(&raw.data()[..], br#"{"id":7,"title":"buy milk"}"#);
}

#[tokio::test]
async fn later_write_overwrites_same_identity() {
    let backend = TestBackend::new(ValueFormat::Bincode);
    let key = RequestKey::new("get", "https://app.example/api/tasks/7#details");
    backend.set(&key, &CachedEntry::new(task())).await.unwrap();

    let renamed = Task {
        title: "buy oat milk".into(),
        ..task()
    };
    let same = RequestKey::get("https://app.example/api/tasks/7");
    backend.set(&same, &CachedEntry::new(renamed.clone())).await.unwrap();

    assert_eq!(backend.keys().await.unwrap().len(), 1);
    let restored = backend.get::<Task>(&key).await.unwrap().unwrap();
    assert_eq!(restored.into_inner(), renamed);
}

#[tokio::test]
async fn missing_key_reads_none_and_deletes_missing() {
    let backend = TestBackend::new(ValueFormat::Json);
    let key = RequestKey::get("https://app.example/nothing");
    assert!(backend.get::<Task>(&key).await.unwrap().is_none());
    assert_eq!(backend.delete(&key).await.unwrap(), DeleteStatus::Missing);
}

#[tokio::test]
async fn errors_propagate_through_dyn_backend() {
    let backend: Arc<dyn Backend> = Arc::new(ErrorBackend);
    let key = RequestKey::get("https://app.example/");

    let read = backend.get::<Task>(&key).await;
    assert!(matches!(read, Err(BackendError::InternalError(_))));

    let write = backend.set(&key, &CachedEntry::new(task())).await;
    assert!(matches!(write, Err(BackendError::QuotaExceeded(_))));
}
