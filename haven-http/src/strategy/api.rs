use std::sync::Arc;

use haven::{CacheStorage, Messages, metrics};
use tracing::debug;

use crate::{FetchRequest, FetchResponse, Network, SerializableResponse, fallback};

/// Network-first strategy for API calls.
///
/// Every method goes to the network. Only successful `GET` responses are
/// cached and only `GET` requests are answered from cache; a mutating
/// request that cannot reach the network always gets the offline JSON body,
/// leaving it to the caller to queue the action for replay.
#[derive(Debug, Clone)]
pub struct ApiStrategy {
    storage: CacheStorage,
    messages: Arc<Messages>,
}

impl ApiStrategy {
    pub fn new(storage: CacheStorage, messages: Arc<Messages>) -> Self {
        Self { storage, messages }
    }

    pub async fn handle<N: Network>(&self, request: FetchRequest, network: &mut N) -> FetchResponse {
        let key = request.key();
        let is_get = request.is_get();
        match network.call(request).await {
            Ok(response) => {
                if is_get && response.is_success() {
                    let partition = self.storage.partitions().dynamic_name();
                    self.storage
                        .put(partition, &key, &response.to_serializable())
                        .await;
                }
                response
            }
            Err(error) => {
                debug!(%key, %error, "api fetch failed");
                metrics::record_network_failure("api");
                if is_get {
                    if let Some(hit) = self.storage.lookup::<SerializableResponse>(&key).await {
                        debug!(%key, partition = %hit.partition, "api served from cache");
                        metrics::record_cache_hit("api");
                        let mut response = FetchResponse::from_cache(hit);
                        response.mark_served_by_cache();
                        return response;
                    }
                    metrics::record_cache_miss("api");
                }
                metrics::record_offline_fallback("api");
                fallback::offline_json(&self.messages)
            }
        }
    }
}
