//! Traits and structs for haven storage interaction.
//!
//! Three storage seams live here:
//!
//! - [`Backend`] - one cache partition, a key-value map from
//!   [`RequestKey`](haven_core::RequestKey) to raw response snapshots
//! - [`Storage`] - the set of named partitions a worker can open and delete
//! - [`ActionLog`] - a durable, ordered log the offline action queue writes to
//!
//! If you want to keep partitions or queued actions somewhere new, implement
//! these traits.
mod backend;
mod error;
pub mod format;
mod log;
mod storage;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{FormatError, ValueFormat};
pub use log::{ActionLog, LogRecord};
pub use storage::Storage;

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record or partition deleted; carries the number of entries freed.
    Deleted(u32),
    /// Record or partition already missing.
    Missing,
}
