mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedReplay, init_tracing};
use haven::{OfflineAction, OfflineQueue, RetryPolicy};
use haven_feoxdb::FeOxDbActionLog;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn action(method: &str, path: &str) -> OfflineAction {
    OfflineAction::new(method, format!("https://app.example{path}"))
        .header("content-type", "application/json")
        .body(r#"{"done":true}"#)
}

fn memory_queue(retry: RetryPolicy) -> OfflineQueue {
    OfflineQueue::new(Arc::new(FeOxDbActionLog::in_memory().unwrap()), retry)
}

#[tokio::test]
async fn drain_replays_in_fifo_order() {
    init_tracing();
    let queue = memory_queue(RetryPolicy::default());
    queue.enqueue(action("POST", "/api/tasks")).await.unwrap();
    queue.enqueue(action("PUT", "/api/tasks/1")).await.unwrap();
    queue.enqueue(action("DELETE", "/api/tasks/2")).await.unwrap();

    let mut replay = ScriptedReplay::default();
    let report = queue.drain(&mut replay).await.unwrap();

    assert_eq!(
        replay.calls(),
        vec![
            "POST https://app.example/api/tasks",
            "PUT https://app.example/api/tasks/1",
            "DELETE https://app.example/api/tasks/2",
        ]
    );
    assert_eq!(report.replayed.len(), 3);
    assert!(report.is_complete());
    assert!(queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn failure_stops_drain_and_keeps_action_in_place() {
    let queue = memory_queue(RetryPolicy::immediate(5));
    let first = queue.enqueue(action("POST", "/api/tasks")).await.unwrap();
    queue.enqueue(action("POST", "/api/floors")).await.unwrap();

    let mut replay = ScriptedReplay::new([Err("connection refused".to_owned())]);
    let report = queue.drain(&mut replay).await.unwrap();

    assert!(report.replayed.is_empty());
    let failed = report.failed.unwrap();
    assert_eq!(failed.id, first);
    assert_eq!(failed.attempts, 1);
    assert_eq!(failed.last_error.as_deref(), Some("connection refused"));
    assert_eq!(report.remaining, 2);
    assert_eq!(replay.calls().len(), 1, "later actions wait for the first");

    let pending = queue.pending().await.unwrap();
    assert_eq!(pending[0].id, first);
    assert_eq!(pending[0].attempts, 1);

    let report = queue.drain(&mut replay).await.unwrap();
    assert_eq!(report.replayed.len(), 2);
    assert_eq!(report.replayed[0].id, first);
}

#[tokio::test]
async fn backing_off_action_defers_the_drain() {
    let retry = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_secs(3600),
        max_delay: Duration::from_secs(3600),
    };
    let queue = memory_queue(retry);
    queue.enqueue(action("POST", "/api/tasks")).await.unwrap();

    let mut replay = ScriptedReplay::new([Err("timeout".to_owned())]);
    queue.drain(&mut replay).await.unwrap();

    let report = queue.drain(&mut replay).await.unwrap();
    assert!(report.deferred);
    assert_eq!(report.remaining, 1);
    assert_eq!(replay.calls().len(), 1, "no replay while backing off");
}

#[tokio::test]
async fn exhausted_action_is_abandoned() {
    let queue = memory_queue(RetryPolicy::immediate(2));
    queue.enqueue(action("POST", "/api/tasks")).await.unwrap();

    let mut replay = ScriptedReplay::new([Err("500".to_owned()), Err("500".to_owned())]);
    let first = queue.drain(&mut replay).await.unwrap();
    assert!(first.failed.is_some());

    let second = queue.drain(&mut replay).await.unwrap();
    assert_eq!(second.abandoned.len(), 1);
    assert_eq!(second.abandoned[0].attempts, 2);
    assert!(second.is_complete());
    assert!(queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn abandoning_an_action_does_not_block_the_next_one() {
    let queue = memory_queue(RetryPolicy::immediate(1));
    queue.enqueue(action("POST", "/api/tasks/a")).await.unwrap();
    queue.enqueue(action("POST", "/api/tasks/b")).await.unwrap();

    let mut replay = ScriptedReplay::new([Err("500".to_owned())]);
    let report = queue.drain(&mut replay).await.unwrap();

    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.replayed.len(), 1);
    assert_eq!(report.replayed[0].action.url, "https://app.example/api/tasks/b");
    assert_eq!(report.remaining, 0);
    assert!(report.is_complete());
    assert_eq!(
        replay.calls(),
        vec![
            "POST https://app.example/api/tasks/a",
            "POST https://app.example/api/tasks/b",
        ]
    );
    assert!(queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn queue_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let log = FeOxDbActionLog::builder().path(dir.path()).build().unwrap();
        let queue = OfflineQueue::new(Arc::new(log.clone()), RetryPolicy::default());
        queue.enqueue(action("POST", "/api/tasks")).await.unwrap();
        queue.enqueue(action("PUT", "/api/buildings/4")).await.unwrap();
        log.flush();
    }

    let log = FeOxDbActionLog::builder()
        .path(dir.path().join("queue.db"))
        .build()
        .unwrap();
    let queue = OfflineQueue::new(Arc::new(log), RetryPolicy::default());
    let pending = queue.pending().await.unwrap();
    let methods: Vec<_> = pending.iter().map(|a| a.action.method.as_str()).collect();
    assert_eq!(methods, vec!["POST", "PUT"]);
    assert_eq!(pending[0].action.body.as_ref(), br#"{"done":true}"#);

    let mut replay = ScriptedReplay::default();
    assert!(queue.drain(&mut replay).await.unwrap().is_complete());
}

#[test]
fn backoff_doubles_up_to_the_cap() {
    let retry = RetryPolicy {
        max_attempts: 10,
        base_delay: Duration::from_secs(30),
        max_delay: Duration::from_secs(300),
    };
    assert_eq!(retry.delay_after(0), Duration::ZERO);
    assert_eq!(retry.delay_after(1), Duration::from_secs(30));
    assert_eq!(retry.delay_after(2), Duration::from_secs(60));
    assert_eq!(retry.delay_after(4), Duration::from_secs(240));
    assert_eq!(retry.delay_after(5), Duration::from_secs(300));
    assert_eq!(retry.delay_after(40), Duration::from_secs(300));
}
