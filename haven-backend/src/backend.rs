use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use haven_core::{CachedEntry, Raw, RequestKey};
use serde::{Serialize, de::DeserializeOwned};

use crate::{BackendError, DeleteStatus, ValueFormat};

pub type BackendResult<T> = Result<T, BackendError>;

/// One cache partition.
///
/// A partition maps request identities to raw response snapshots. Entries
/// never expire on their own; they are overwritten by a newer write for the
/// same key or dropped together with the partition.
#[async_trait]
pub trait Backend: Sync + Send {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CachedEntry<Raw>>>;

    async fn write(&self, key: &RequestKey, value: CachedEntry<Raw>) -> BackendResult<()>;

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus>;

    /// Lists every key currently held by the partition.
    async fn keys(&self) -> BackendResult<Vec<RequestKey>>;

    /// Returns the name of this partition, e.g. `tasks-static-v3`.
    fn name(&self) -> &str {
        "backend"
    }

    fn value_format(&self) -> ValueFormat {
        ValueFormat::Json
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + 'static> {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CachedEntry<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &RequestKey, value: CachedEntry<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        (**self).keys().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn value_format(&self) -> ValueFormat {
        (**self).value_format()
    }
}

/// Typed operations on top of [`Backend`].
///
/// Values are encoded with the partition's [`ValueFormat`] on the way in and
/// decoded on the way out, keeping the original write time.
pub trait CacheBackend: Backend {
    fn get<T>(
        &self,
        key: &RequestKey,
    ) -> impl Future<Output = BackendResult<Option<CachedEntry<T>>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.read(key).await? {
                Some(entry) => {
                    let (raw, stored_at) = entry.into_parts();
                    let value = self.value_format().decode::<T>(&raw)?;
                    Ok(Some(CachedEntry::with_timestamp(value, stored_at)))
                }
                None => Ok(None),
            }
        }
    }

    fn set<T>(
        &self,
        key: &RequestKey,
        value: &CachedEntry<T>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let raw = self.value_format().encode(value.data())?;
            self.write(key, CachedEntry::with_timestamp(raw, value.stored_at()))
                .await
        }
    }

    fn delete(&self, key: &RequestKey) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl<T: Backend + ?Sized> CacheBackend for T {}
