//! Stored cache entries.
//!
//! Entries carry no expiry: a partition keeps an entry until it is
//! overwritten by a newer response for the same [`RequestKey`] or until the
//! whole partition is deleted. The write timestamp is kept for diagnostics.
//!
//! [`RequestKey`]: crate::RequestKey

use chrono::{DateTime, Utc};

/// A value stored in a cache partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry<T> {
    data: T,
    stored_at: DateTime<Utc>,
}

impl<T> CachedEntry<T> {
    /// Wraps data written right now.
    pub fn new(data: T) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Wraps data with an explicit write time, used when restoring entries.
    pub fn with_timestamp(data: T, stored_at: DateTime<Utc>) -> Self {
        CachedEntry { data, stored_at }
    }

    /// Returns a reference to the stored data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the entry was written.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Consumes the entry and returns the data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Splits the entry into data and write time.
    pub fn into_parts(self) -> (T, DateTime<Utc>) {
        (self.data, self.stored_at)
    }

    /// Transforms the data, keeping the write time.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CachedEntry<U> {
        CachedEntry {
            data: f(self.data),
            stored_at: self.stored_at,
        }
    }
}
