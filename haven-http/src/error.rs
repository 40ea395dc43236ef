use http::StatusCode;
use thiserror::Error;

/// Why a request could not be answered by the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No connectivity, DNS failure, refused connection.
    #[error("network unreachable: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The server answered, but not with success.
    #[error("upstream answered {0}")]
    Status(StatusCode),

    /// The request cannot be expressed (bad URL or method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The page that issued the request went away.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether the failure means the network could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout)
    }
}
