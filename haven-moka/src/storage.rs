//! Named partition set.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use dashmap::DashMap;
use haven_backend::{Backend, BackendResult, DeleteStatus, Storage, ValueFormat};
use smol_str::SmolStr;
use tracing::debug;

use crate::backend::MokaBackend;
use crate::builder::{Capacity, MokaBackendBuilder};

struct Slot {
    created: u64,
    backend: Arc<MokaBackend>,
}

/// In-memory [`Storage`] holding one [`MokaBackend`] per partition name.
///
/// Every partition is built from the same template, so they share capacity
/// and value format settings.
pub struct MokaStorage {
    partitions: DashMap<SmolStr, Slot>,
    sequence: AtomicU64,
    template: MokaBackendBuilder,
}

impl MokaStorage {
    /// Creates storage whose partitions use default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for the partition template.
    pub fn builder() -> MokaStorageBuilder {
        MokaStorageBuilder {
            template: MokaBackendBuilder::new("partition"),
        }
    }
}

impl Default for MokaStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MokaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStorage")
            .field("partitions", &self.partitions.len())
            .field("capacity", &self.template.get_capacity())
            .finish()
    }
}

/// Builder for [`MokaStorage`].
pub struct MokaStorageBuilder {
    template: MokaBackendBuilder,
}

impl MokaStorageBuilder {
    /// Limits each partition to `capacity` entries.
    pub fn max_entries(mut self, capacity: u64) -> Self {
        self.template = self.template.max_entries(capacity);
        self
    }

    /// Limits each partition to roughly `bytes` of stored data.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.template = self.template.max_bytes(bytes);
        self
    }

    /// Sets each partition's capacity bound directly.
    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.template = self.template.capacity(capacity);
        self
    }

    /// Sets the format typed values are stored in.
    pub fn value_format(mut self, format: ValueFormat) -> Self {
        self.template = self.template.value_format(format);
        self
    }

    /// Builds an empty storage.
    pub fn build(self) -> MokaStorage {
        MokaStorage {
            partitions: DashMap::new(),
            sequence: AtomicU64::new(0),
            template: self.template,
        }
    }
}

#[async_trait]
impl Storage for MokaStorage {
    async fn open(&self, name: &str) -> BackendResult<Arc<dyn Backend>> {
        let slot = self.partitions.entry(SmolStr::new(name)).or_insert_with(|| {
            debug!(partition = name, "creating partition");
            Slot {
                created: self.sequence.fetch_add(1, Ordering::Relaxed),
                backend: Arc::new(self.template.clone().name(name).build()),
            }
        });
        Ok(slot.backend.clone() as Arc<dyn Backend>)
    }

    async fn partition(&self, name: &str) -> BackendResult<Option<Arc<dyn Backend>>> {
        Ok(self
            .partitions
            .get(name)
            .map(|slot| slot.backend.clone() as Arc<dyn Backend>))
    }

    async fn delete(&self, name: &str) -> BackendResult<DeleteStatus> {
        match self.partitions.remove(name) {
            Some((_, slot)) => {
                let entries = slot.backend.cache().entry_count();
                slot.backend.cache().invalidate_all();
                debug!(partition = name, entries, "deleted partition");
                Ok(DeleteStatus::Deleted(entries.min(u32::MAX as u64) as u32))
            }
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn names(&self) -> BackendResult<Vec<String>> {
        let mut slots: Vec<(u64, String)> = self
            .partitions
            .iter()
            .map(|slot| (slot.created, slot.key().to_string()))
            .collect();
        slots.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(slots.into_iter().map(|(_, name)| name).collect())
    }
}
