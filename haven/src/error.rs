use haven_backend::{BackendError, FormatError};
use smol_str::SmolStr;
use thiserror::Error;

use crate::lifecycle::WorkerState;

/// Errors raised by the offline worker.
///
/// Failures on best-effort paths (cache writes, fallback lookups) never
/// surface as `WorkerError`; they are logged and swallowed where they happen.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Storage failed underneath a partition or the action log.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A stored record could not be encoded or decoded.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Fetching the app shell failed; nothing was committed.
    #[error("install of {version} failed: {reason}")]
    InstallFailed {
        /// Version tag of the worker that failed to install.
        version: SmolStr,
        /// What went wrong.
        reason: String,
    },

    /// The requested lifecycle step is not allowed from the current state.
    #[error("worker {version} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Version tag of the worker.
        version: SmolStr,
        /// Current state.
        from: WorkerState,
        /// Requested state.
        to: WorkerState,
    },

    /// A push payload was not valid UTF-8.
    #[error("push payload is not valid UTF-8")]
    InvalidPayload,

    /// The notification could not be shown.
    #[error("notification failed: {0}")]
    Notification(String),
}
