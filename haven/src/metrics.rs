//! Metrics declaration and recording helpers.
//!
//! Every helper compiles to a no-op when the `metrics` feature is disabled.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of requests answered from a cache partition.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "haven_cache_hit_total",
            "Total number of requests answered from a cache partition."
        );
        "haven_cache_hit_total"
    };
    /// Track number of cache lookups that found nothing.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "haven_cache_miss_total",
            "Total number of cache lookups that found nothing."
        );
        "haven_cache_miss_total"
    };
    /// Track number of failed network fetches.
    pub static ref NETWORK_FAILURE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "haven_network_failure_total",
            "Total number of network fetches that failed."
        );
        "haven_network_failure_total"
    };
    /// Track number of synthesized offline responses.
    pub static ref OFFLINE_FALLBACK_COUNTER: &'static str = {
        metrics::describe_counter!(
            "haven_offline_fallback_total",
            "Total number of synthesized offline responses."
        );
        "haven_offline_fallback_total"
    };
    /// Track number of swallowed cache write errors.
    pub static ref CACHE_WRITE_ERRORS: &'static str = {
        metrics::describe_counter!(
            "haven_cache_write_errors_total",
            "Total number of cache writes that failed and were ignored."
        );
        "haven_cache_write_errors_total"
    };
    /// Track number of actions added to the offline queue.
    pub static ref ACTIONS_ENQUEUED: &'static str = {
        metrics::describe_counter!(
            "haven_actions_enqueued_total",
            "Total number of actions added to the offline queue."
        );
        "haven_actions_enqueued_total"
    };
    /// Track number of offline actions replayed successfully.
    pub static ref ACTIONS_REPLAYED: &'static str = {
        metrics::describe_counter!(
            "haven_actions_replayed_total",
            "Total number of offline actions replayed successfully."
        );
        "haven_actions_replayed_total"
    };
    /// Track number of failed replay attempts.
    pub static ref ACTIONS_FAILED: &'static str = {
        metrics::describe_counter!(
            "haven_actions_failed_total",
            "Total number of failed offline action replay attempts."
        );
        "haven_actions_failed_total"
    };
    /// Track number of actions dropped after exhausting their retries.
    pub static ref ACTIONS_ABANDONED: &'static str = {
        metrics::describe_counter!(
            "haven_actions_abandoned_total",
            "Total number of offline actions dropped after exhausting retries."
        );
        "haven_actions_abandoned_total"
    };
}

/// Record a cache hit for a request class.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_hit(class: &'static str) {
    metrics::counter!(*CACHE_HIT_COUNTER, "class" => class).increment(1);
}

/// Record a cache hit (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_hit(_class: &'static str) {}

/// Record a cache miss for a request class.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_miss(class: &'static str) {
    metrics::counter!(*CACHE_MISS_COUNTER, "class" => class).increment(1);
}

/// Record a cache miss (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_miss(_class: &'static str) {}

/// Record a failed network fetch for a request class.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_network_failure(class: &'static str) {
    metrics::counter!(*NETWORK_FAILURE_COUNTER, "class" => class).increment(1);
}

/// Record a failed network fetch (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_network_failure(_class: &'static str) {}

/// Record a synthesized offline response for a request class.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_offline_fallback(class: &'static str) {
    metrics::counter!(*OFFLINE_FALLBACK_COUNTER, "class" => class).increment(1);
}

/// Record a synthesized offline response (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_offline_fallback(_class: &'static str) {}

/// Record a swallowed cache write error.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_write_error(partition: &str) {
    metrics::counter!(*CACHE_WRITE_ERRORS, "partition" => partition.to_string()).increment(1);
}

/// Record a swallowed cache write error (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_write_error(_partition: &str) {}

/// Record the outcome of queue operations.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_queue(enqueued: u64, replayed: u64, failed: u64, abandoned: u64) {
    metrics::counter!(*ACTIONS_ENQUEUED).increment(enqueued);
    metrics::counter!(*ACTIONS_REPLAYED).increment(replayed);
    metrics::counter!(*ACTIONS_FAILED).increment(failed);
    metrics::counter!(*ACTIONS_ABANDONED).increment(abandoned);
}

/// Record the outcome of queue operations (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_queue(_enqueued: u64, _replayed: u64, _failed: u64, _abandoned: u64) {}
