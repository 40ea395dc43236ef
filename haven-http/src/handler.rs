use std::sync::Arc;

use haven::{CacheStorage, Messages, WorkerConfig};
use tracing::{Instrument, debug, info_span};

use crate::router::{RequestClass, Route, Router};
use crate::strategy::{ApiStrategy, CacheFirst, NetworkFirst};
use crate::{FetchError, FetchRequest, FetchResponse, Network};

/// Entry point for intercepted requests.
///
/// Routes every request and hands it to the strategy of its class. Requests
/// the worker does not intercept go straight to the network.
#[derive(Debug, Clone)]
pub struct FetchHandler {
    router: Router,
    page: NetworkFirst,
    api: ApiStrategy,
    assets: CacheFirst,
}

impl FetchHandler {
    pub fn new(router: Router, storage: CacheStorage, messages: Arc<Messages>) -> Self {
        Self {
            router,
            page: NetworkFirst::new(storage.clone(), messages.clone()),
            api: ApiStrategy::new(storage.clone(), messages),
            assets: CacheFirst::new(storage),
        }
    }

    /// Builds the handler from worker configuration.
    pub fn from_config(config: &WorkerConfig, storage: CacheStorage) -> Result<Self, FetchError> {
        Ok(Self::new(
            Router::from_config(config)?,
            storage,
            Arc::new(config.messages.clone()),
        ))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Answers one intercepted request.
    ///
    /// Pages and API calls always resolve to a response. Only a static asset
    /// that is neither cached nor reachable, and is not an image, resolves to
    /// an error; the same holds for pass-through requests.
    pub async fn fetch<N: Network>(
        &self,
        request: FetchRequest,
        network: &mut N,
    ) -> Result<FetchResponse, FetchError> {
        let route = self.router.route(&request);
        let span = info_span!(
            "haven.fetch",
            method = %request.method,
            url = %request.uri,
            class = route.class().map(|c| c.as_str()).unwrap_or("passthrough"),
        );
        async move {
            let response = match route {
                Route::PassThrough => {
                    debug!("not intercepted");
                    network.call(request).await
                }
                Route::Intercept(RequestClass::Page) => Ok(self.page.handle(request, network).await),
                Route::Intercept(RequestClass::Api) => Ok(self.api.handle(request, network).await),
                Route::Intercept(RequestClass::Static) => self.assets.handle(request, network).await,
            };
            match &response {
                Ok(response) => debug!(status = %response.status, source = %response.source, "answered"),
                Err(error) => debug!(%error, "unanswered"),
            }
            response
        }
        .instrument(span)
        .await
    }
}
