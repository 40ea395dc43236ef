//! Moka partition implementation.

use async_trait::async_trait;
use haven_backend::{Backend, BackendError, BackendResult, DeleteStatus, ValueFormat};
use haven_core::{CachedEntry, Raw, RequestKey};
use moka::future::Cache;
use smol_str::SmolStr;

use crate::builder::{Capacity, MokaBackendBuilder, byte_weigher};
use crate::metrics::record_capacity;

/// One in-memory cache partition powered by Moka.
///
/// Reads are lock-free. A write for an existing key replaces the stored
/// response. Entries stay until they are removed or the partition is
/// dropped. A bounded partition that is full refuses new keys with
/// [`BackendError::QuotaExceeded`].
///
/// Data is **not persisted**: a partition is lost on process restart.
#[derive(Clone)]
pub struct MokaBackend {
    /// The underlying Moka async cache instance.
    pub cache: Cache<RequestKey, CachedEntry<Raw>>,
    name: SmolStr,
    format: ValueFormat,
    capacity: Capacity,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MokaBackend {
    /// Creates a new builder for a partition with the given name.
    pub fn builder(name: impl AsRef<str>) -> MokaBackendBuilder {
        MokaBackendBuilder::new(name)
    }

    pub(crate) fn from_parts(
        cache: Cache<RequestKey, CachedEntry<Raw>>,
        name: SmolStr,
        format: ValueFormat,
        capacity: Capacity,
    ) -> Self {
        MokaBackend {
            cache,
            name,
            format,
            capacity,
        }
    }

    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<RequestKey, CachedEntry<Raw>> {
        &self.cache
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Checks that a new key still fits. Overwrites are always admitted.
    async fn admit(&self, key: &RequestKey, value: &CachedEntry<Raw>) -> BackendResult<()> {
        if self.capacity == Capacity::Unbounded || self.cache.contains_key(key) {
            return Ok(());
        }
        self.cache.run_pending_tasks().await;
        let full = match self.capacity {
            Capacity::Unbounded => false,
            Capacity::Entries(max) => self.cache.entry_count() >= max,
            Capacity::Bytes(max) => {
                self.cache.weighted_size() + u64::from(byte_weigher(key, value)) > max
            }
        };
        if full {
            return Err(BackendError::QuotaExceeded(format!(
                "partition {} is full ({:?})",
                self.name, self.capacity
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CachedEntry<Raw>>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &RequestKey, value: CachedEntry<Raw>) -> BackendResult<()> {
        self.admit(key, &value).await?;
        self.cache.insert(key.clone(), value).await;
        record_capacity(
            &self.name,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self
            .cache
            .iter()
            .map(|(key, _)| key.as_ref().clone())
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value_format(&self) -> ValueFormat {
        self.format
    }
}
