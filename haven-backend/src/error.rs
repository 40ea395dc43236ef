//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur while reading or writing
/// partitions and action logs.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to running out of storage.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send>),

    /// The store refused the write because it is full.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}
