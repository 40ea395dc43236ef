use std::time::Duration;

use futures::future::BoxFuture;
use haven_core::Upstream;
use haven_http::{FetchError, FetchRequest, FetchResponse};
use tracing::debug;

/// [`Network`](haven_http::Network) backed by a [`reqwest::Client`].
///
/// Cloning is cheap; clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestNetwork {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestNetwork {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout. A request that exceeds it fails with
    /// [`FetchError::Timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Default for ReqwestNetwork {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

fn map_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_builder() {
        FetchError::InvalidRequest(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

impl Upstream<FetchRequest> for ReqwestNetwork {
    type Response = Result<FetchResponse, FetchError>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, req: FetchRequest) -> Self::Future {
        let client = self.client.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let mut builder = http::Request::builder()
                .method(req.method)
                .uri(req.uri);
            if let Some(headers) = builder.headers_mut() {
                *headers = req.headers;
            }
            let http_request = builder
                .body(req.body)
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
            let mut request = reqwest::Request::try_from(http_request).map_err(map_error)?;
            *request.timeout_mut() = timeout;

            let url = request.url().to_string();
            let response = client.execute(request).await.map_err(map_error)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(map_error)?;
            debug!(%url, %status, bytes = body.len(), "network answered");

            let mut response = FetchResponse::new(status, body);
            response.headers = headers;
            Ok(response)
        })
    }
}
