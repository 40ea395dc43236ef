use std::sync::Arc;

use async_trait::async_trait;

use crate::{Backend, BackendResult, DeleteStatus};

/// The set of named cache partitions available to a worker.
///
/// Opening a partition that does not exist creates it. Lookups that span
/// partitions walk [`Storage::names`], which returns the most recently created
/// partition first.
#[async_trait]
pub trait Storage: Sync + Send {
    /// Opens (creating when missing) the named partition.
    async fn open(&self, name: &str) -> BackendResult<Arc<dyn Backend>>;

    /// Returns the named partition only when it already exists.
    async fn partition(&self, name: &str) -> BackendResult<Option<Arc<dyn Backend>>>;

    /// Deletes a partition with all of its entries.
    async fn delete(&self, name: &str) -> BackendResult<DeleteStatus>;

    /// Lists existing partition names, most recently created first.
    async fn names(&self) -> BackendResult<Vec<String>>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn open(&self, name: &str) -> BackendResult<Arc<dyn Backend>> {
        (**self).open(name).await
    }

    async fn partition(&self, name: &str) -> BackendResult<Option<Arc<dyn Backend>>> {
        (**self).partition(name).await
    }

    async fn delete(&self, name: &str) -> BackendResult<DeleteStatus> {
        (**self).delete(name).await
    }

    async fn names(&self) -> BackendResult<Vec<String>> {
        (**self).names().await
    }
}
