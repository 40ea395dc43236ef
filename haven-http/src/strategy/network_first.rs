use std::sync::Arc;

use haven::{CacheStorage, Messages, metrics};
use tracing::debug;

use crate::{FetchRequest, FetchResponse, Network, SerializableResponse, fallback};

/// Network-first strategy for navigations.
///
/// Always resolves to a response: live, cached, or the offline page.
#[derive(Debug, Clone)]
pub struct NetworkFirst {
    storage: CacheStorage,
    messages: Arc<Messages>,
}

impl NetworkFirst {
    pub fn new(storage: CacheStorage, messages: Arc<Messages>) -> Self {
        Self { storage, messages }
    }

    pub async fn handle<N: Network>(&self, request: FetchRequest, network: &mut N) -> FetchResponse {
        let key = request.key();
        match network.call(request).await {
            Ok(response) => {
                if response.status.is_success() || response.status.is_redirection() {
                    let partition = self.storage.partitions().dynamic_name();
                    self.storage
                        .put(partition, &key, &response.to_serializable())
                        .await;
                }
                response
            }
            Err(error) => {
                debug!(%key, %error, "page fetch failed, trying cache");
                metrics::record_network_failure("page");
                match self.storage.lookup::<SerializableResponse>(&key).await {
                    Some(hit) => {
                        debug!(%key, partition = %hit.partition, "page served from cache");
                        metrics::record_cache_hit("page");
                        FetchResponse::from_cache(hit)
                    }
                    None => {
                        metrics::record_cache_miss("page");
                        metrics::record_offline_fallback("page");
                        fallback::offline_page(&self.messages)
                    }
                }
            }
        }
    }
}
