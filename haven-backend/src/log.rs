use std::sync::Arc;

use async_trait::async_trait;
use haven_core::Raw;

use crate::{BackendResult, DeleteStatus};

/// A record read back from an [`ActionLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub id: u64,
    pub data: Raw,
}

/// Durable append-only log with in-place updates and removal.
///
/// Identifiers are assigned by the log, strictly increase, and are never
/// reused, so [`ActionLog::load`] returns records in insertion order.
/// Every successful call must survive a process restart.
#[async_trait]
pub trait ActionLog: Sync + Send {
    /// Appends a record and returns its identifier.
    async fn append(&self, data: Raw) -> BackendResult<u64>;

    /// Replaces the data of an existing record.
    async fn update(&self, id: u64, data: Raw) -> BackendResult<()>;

    async fn remove(&self, id: u64) -> BackendResult<DeleteStatus>;

    /// Loads every live record in insertion order.
    async fn load(&self) -> BackendResult<Vec<LogRecord>>;

    fn name(&self) -> &str {
        "log"
    }
}

#[async_trait]
impl<L: ActionLog + ?Sized> ActionLog for Arc<L> {
    async fn append(&self, data: Raw) -> BackendResult<u64> {
        (**self).append(data).await
    }

    async fn update(&self, id: u64, data: Raw) -> BackendResult<()> {
        (**self).update(id, data).await
    }

    async fn remove(&self, id: u64) -> BackendResult<DeleteStatus> {
        (**self).remove(id).await
    }

    async fn load(&self) -> BackendResult<Vec<LogRecord>> {
        (**self).load().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
