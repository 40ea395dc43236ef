use haven_core::Upstream;

use crate::{FetchError, FetchRequest, FetchResponse};

/// The network as seen by the worker.
///
/// A transport failure is an `Err`; any HTTP answer, error statuses included,
/// is an `Ok` response.
pub trait Network:
    Upstream<FetchRequest, Response = Result<FetchResponse, FetchError>> + Send
{
}

impl<T> Network for T where
    T: Upstream<FetchRequest, Response = Result<FetchResponse, FetchError>> + Send
{
}
