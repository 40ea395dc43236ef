use std::future::Future;

/// Trait for calling whatever sits behind the worker: the network for page,
/// API and asset requests, or the backend when replaying queued actions.
///
/// The worker never assumes a concrete client. Tests drive the handlers with
/// scripted upstreams; production wires in `haven-reqwest`.
///
/// # Examples
///
/// ```rust,ignore
/// use haven_core::Upstream;
/// use std::future::Ready;
///
/// struct Offline;
///
/// impl Upstream<MyRequest> for Offline {
///     type Response = Result<MyResponse, MyError>;
///     type Future = Ready<Self::Response>;
///
///     fn call(&mut self, _req: MyRequest) -> Self::Future {
///         std::future::ready(Err(MyError::Offline))
///     }
/// }
/// ```
pub trait Upstream<Req> {
    /// The response type returned by the upstream.
    type Response;

    /// The future that resolves to the response.
    type Future: Future<Output = Self::Response> + Send;

    /// Send the request upstream.
    fn call(&mut self, req: Req) -> Self::Future;
}
