#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Worker configuration.
///
/// [`WorkerConfig`](config::WorkerConfig) carries the version tag, the app
/// shell, the API routing rules, localized messages and the replay policy.
pub mod config;

/// Error types for worker operations.
pub mod error;

/// Install, activate and update transitions.
pub mod lifecycle;

/// Metrics collection for worker observability.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// cache hits and misses, fallbacks and offline action replays.
pub mod metrics;

/// Notification model shared by push messages and replay confirmations.
pub mod notification;

/// Durable queue of actions performed while offline.
pub mod queue;

/// Observable application state.
pub mod state;

/// Versioned cache partitions.
pub mod storage;

pub use config::{Messages, PartitionNames, WorkerConfig};
pub use error::WorkerError;
pub use lifecycle::{ClientMessage, Lifecycle, Registration, WorkerMessage, WorkerState};
pub use notification::{Notification, Notifier, PushPayload};
pub use queue::{DrainReport, OfflineAction, OfflineQueue, QueuedAction, RetryPolicy};
pub use state::{PwaEvent, PwaState, PwaStateController};
pub use storage::{CacheHit, CacheStorage};

pub use haven_core::{CachedEntry, RequestKey, ResponseSource, Upstream};
