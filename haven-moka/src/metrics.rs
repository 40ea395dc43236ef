//! Moka partition capacity metrics.
//!
//! Enable the `metrics` feature to publish them.
//!
//! - `haven_moka_entries` - current number of entries in a partition (gauge)
//! - `haven_moka_size_bytes` - current weighted size in bytes (gauge)
//!
//! Both carry a `partition` label.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for partition entry count gauge.
    pub static ref MOKA_ENTRIES: &'static str = {
        metrics::describe_gauge!(
            "haven_moka_entries",
            "Current number of entries in the Moka partition."
        );
        "haven_moka_entries"
    };

    /// Metric name for partition size gauge.
    pub static ref MOKA_SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "haven_moka_size_bytes",
            "Current weighted size of the Moka partition in bytes."
        );
        "haven_moka_size_bytes"
    };
}

/// Record current partition capacity.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_capacity(partition: &str, entries: u64, size_bytes: u64) {
    metrics::gauge!(*MOKA_ENTRIES, "partition" => partition.to_string()).set(entries as f64);
    metrics::gauge!(*MOKA_SIZE_BYTES, "partition" => partition.to_string()).set(size_bytes as f64);
}

/// Record current partition capacity (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_capacity(_partition: &str, _entries: u64, _size_bytes: u64) {}
