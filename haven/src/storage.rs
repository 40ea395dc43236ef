use std::sync::Arc;

use haven_backend::{Backend, CacheBackend, DeleteStatus, Storage};
use haven_core::{CachedEntry, RequestKey};
use serde::{Serialize, de::DeserializeOwned};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::WorkerError;
use crate::config::PartitionNames;
use crate::metrics;

/// A value found in a cache partition.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<T> {
    /// The stored value with its write time.
    pub entry: CachedEntry<T>,
    /// Name of the partition it was found in.
    pub partition: SmolStr,
}

/// The cache store of one worker version.
///
/// Wraps a [`Storage`] and knows which two partitions belong to the current
/// version. Only `GET` identities are ever written or read.
///
/// Writes are best-effort: [`put`](Self::put) logs and swallows every
/// failure, and lookups treat a failing partition as a miss.
#[derive(Clone)]
pub struct CacheStorage {
    storage: Arc<dyn Storage>,
    partitions: PartitionNames,
}

impl std::fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStorage")
            .field("partitions", &self.partitions)
            .finish_non_exhaustive()
    }
}

impl CacheStorage {
    /// Creates the store for the given partition names.
    pub fn new(storage: Arc<dyn Storage>, partitions: PartitionNames) -> Self {
        Self {
            storage,
            partitions,
        }
    }

    /// Partition names of the current version.
    pub fn partitions(&self) -> &PartitionNames {
        &self.partitions
    }

    /// Underlying partition set.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Opens the named partition, creating it when missing.
    pub async fn open(&self, name: &str) -> Result<Arc<dyn Backend>, WorkerError> {
        Ok(self.storage.open(name).await?)
    }

    /// Stores `value` under `key` in the named partition.
    ///
    /// Returns whether the value was stored. Non-`GET` identities are
    /// refused and every storage failure is swallowed.
    pub async fn put<T>(&self, partition: &str, key: &RequestKey, value: &T) -> bool
    where
        T: Serialize + Sync,
    {
        if !key.is_get() {
            debug!(%key, "refusing to cache non-GET request");
            return false;
        }
        let backend = match self.storage.open(partition).await {
            Ok(backend) => backend,
            Err(error) => {
                warn!(partition, %key, %error, "cache partition unavailable, response not cached");
                metrics::record_cache_write_error(partition);
                return false;
            }
        };
        let entry = CachedEntry::new(value);
        match backend.set(key, &entry).await {
            Ok(()) => {
                debug!(partition, %key, "cached response");
                true
            }
            Err(error) => {
                warn!(partition, %key, %error, "cache write failed, response not cached");
                metrics::record_cache_write_error(partition);
                false
            }
        }
    }

    /// Looks `key` up in every partition, most recently created first.
    pub async fn lookup<T>(&self, key: &RequestKey) -> Option<CacheHit<T>>
    where
        T: DeserializeOwned + Send,
    {
        if !key.is_get() {
            return None;
        }
        let names = match self.storage.names().await {
            Ok(names) => names,
            Err(error) => {
                warn!(%key, %error, "listing cache partitions failed");
                return None;
            }
        };
        for name in names {
            if let Some(hit) = self.lookup_in(&name, key).await {
                return Some(hit);
            }
        }
        None
    }

    /// Looks `key` up in one partition without creating it.
    pub async fn lookup_in<T>(&self, partition: &str, key: &RequestKey) -> Option<CacheHit<T>>
    where
        T: DeserializeOwned + Send,
    {
        if !key.is_get() {
            return None;
        }
        let backend = match self.storage.partition(partition).await {
            Ok(Some(backend)) => backend,
            Ok(None) => return None,
            Err(error) => {
                warn!(partition, %key, %error, "cache partition unavailable");
                return None;
            }
        };
        match backend.get::<T>(key).await {
            Ok(Some(entry)) => Some(CacheHit {
                entry,
                partition: SmolStr::new(partition),
            }),
            Ok(None) => None,
            Err(error) => {
                warn!(partition, %key, %error, "cache read failed");
                None
            }
        }
    }

    /// Writes a complete set of entries into one partition.
    ///
    /// Unlike [`put`](Self::put) this fails loudly: if any write fails the
    /// partition is deleted again so no partial set is left behind.
    pub async fn commit<T>(
        &self,
        partition: &str,
        entries: &[(RequestKey, T)],
    ) -> Result<(), WorkerError>
    where
        T: Serialize + Sync,
    {
        let backend = self.storage.open(partition).await?;
        for (key, value) in entries {
            if let Err(error) = backend.set(key, &CachedEntry::new(value)).await {
                if let Err(cleanup) = self.storage.delete(partition).await {
                    warn!(partition, error = %cleanup, "dropping partial partition failed");
                }
                return Err(error.into());
            }
        }
        debug!(partition, entries = entries.len(), "committed partition");
        Ok(())
    }

    /// Deletes every partition whose name is not in `current`.
    ///
    /// Returns the names of the deleted partitions.
    pub async fn delete_stale(&self, current: &[&str]) -> Result<Vec<String>, WorkerError> {
        let mut deleted = Vec::new();
        for name in self.storage.names().await? {
            if current.contains(&name.as_str()) {
                continue;
            }
            if let DeleteStatus::Deleted(entries) = self.storage.delete(&name).await? {
                debug!(partition = %name, entries, "deleted stale partition");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Existing partition names, most recently created first.
    pub async fn names(&self) -> Result<Vec<String>, WorkerError> {
        Ok(self.storage.names().await?)
    }
}
