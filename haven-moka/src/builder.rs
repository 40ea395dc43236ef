//! Builder for configuring [`MokaBackend`].

use haven_backend::ValueFormat;
use haven_core::{CachedEntry, Raw, RequestKey};
use moka::future::{Cache, CacheBuilder};
use smol_str::SmolStr;

use crate::backend::MokaBackend;

/// Fixed per-entry overhead added to the weighed size of a response.
const ENTRY_OVERHEAD: usize = 96;

/// How much a partition may hold.
///
/// Entries are never evicted to make room. A bounded partition that is full
/// refuses writes for new keys until it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    /// No limit.
    #[default]
    Unbounded,
    /// At most `n` entries.
    Entries(u64),
    /// Approximately `n` bytes of keys and response bodies.
    Bytes(u64),
}

/// Builder for creating and configuring a [`MokaBackend`].
///
/// ```
/// use haven_moka::MokaBackend;
/// use haven_backend::ValueFormat;
///
/// let partition = MokaBackend::builder("tasks-static-v3")
///     .max_bytes(20 * 1024 * 1024)
///     .value_format(ValueFormat::Bincode)
///     .build();
/// ```
#[derive(Clone)]
pub struct MokaBackendBuilder {
    name: SmolStr,
    capacity: Capacity,
    format: ValueFormat,
}

impl MokaBackendBuilder {
    /// Creates a builder for an unbounded partition with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: SmolStr::new(name.as_ref()),
            capacity: Capacity::default(),
            format: ValueFormat::default(),
        }
    }

    /// Renames the partition being built.
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.name = SmolStr::new(name.as_ref());
        self
    }

    /// Refuses new keys once the partition holds `capacity` entries.
    pub fn max_entries(mut self, capacity: u64) -> Self {
        self.capacity = Capacity::Entries(capacity);
        self
    }

    /// Refuses new keys once the partition holds roughly `bytes` of data.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.capacity = Capacity::Bytes(bytes);
        self
    }

    /// Sets the capacity bound directly.
    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the format typed values are stored in.
    pub fn value_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns the configured capacity.
    pub fn get_capacity(&self) -> Capacity {
        self.capacity
    }

    /// Builds the partition.
    ///
    /// The underlying cache has no maximum capacity, so moka never evicts.
    /// Bounds are enforced by [`MokaBackend`] on write.
    pub fn build(self) -> MokaBackend {
        let cache: Cache<RequestKey, CachedEntry<Raw>> = match self.capacity {
            Capacity::Bytes(_) => CacheBuilder::default()
                .name(&self.name)
                .weigher(byte_weigher)
                .build(),
            Capacity::Unbounded | Capacity::Entries(_) => {
                CacheBuilder::default().name(&self.name).build()
            }
        };
        MokaBackend::from_parts(cache, self.name, self.format, self.capacity)
    }
}

/// Approximate byte cost of a stored response.
pub(crate) fn byte_weigher(key: &RequestKey, value: &CachedEntry<Raw>) -> u32 {
    let size = ENTRY_OVERHEAD + key.method().len() + key.url().len() + value.data().len();
    size.min(u32::MAX as usize) as u32
}
