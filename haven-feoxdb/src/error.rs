use bincode::error::{DecodeError, EncodeError};
use feoxdb::FeoxError;
use haven_backend::BackendError;
use thiserror::Error;

/// Errors that can occur when using [`FeOxDbActionLog`](crate::FeOxDbActionLog).
#[derive(Debug, Error)]
pub enum FeOxDbError {
    /// An error from the underlying FeOxDB database.
    #[error("FeOxDB error: {0}")]
    FeOxDb(#[from] FeoxError),

    /// Failed to serialize log metadata.
    #[error("Serialization error: {0}")]
    Serialization(#[from] EncodeError),

    /// Failed to deserialize log metadata.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] DecodeError),

    /// An I/O error occurred while accessing the database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The record to update does not exist.
    #[error("unknown log record {0}")]
    UnknownRecord(u64),

    /// The provided configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<FeOxDbError> for BackendError {
    fn from(error: FeOxDbError) -> Self {
        BackendError::InternalError(Box::new(error))
    }
}
