use haven::WorkerError;
use haven_http::FetchError;
use thiserror::Error;

use crate::clients::ClientId;
use crate::event::EventKind;

/// Why an event could not be handled.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// A fetch event resolved to no response at all.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The event names a client that is not open.
    #[error("unknown client {0}")]
    UnknownClient(ClientId),

    /// A handler answered with the wrong kind of outcome.
    #[error("{0} handler produced no response")]
    NoResponse(EventKind),

    /// No handler is registered for the event kind.
    #[error("no handler for {0} events")]
    Unhandled(EventKind),
}
