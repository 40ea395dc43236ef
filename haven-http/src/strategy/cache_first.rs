use haven::{CacheStorage, metrics};
use tracing::debug;

use crate::{Destination, FetchError, FetchRequest, FetchResponse, Network, SerializableResponse, fallback};

/// Cache-first strategy for static assets.
///
/// A cached asset is returned without touching the network. On a miss the
/// network answer is cached in the static partition. When both fail, images
/// get a placeholder and everything else gets the error.
#[derive(Debug, Clone)]
pub struct CacheFirst {
    storage: CacheStorage,
}

impl CacheFirst {
    pub fn new(storage: CacheStorage) -> Self {
        Self { storage }
    }

    pub async fn handle<N: Network>(
        &self,
        request: FetchRequest,
        network: &mut N,
    ) -> Result<FetchResponse, FetchError> {
        let key = request.key();
        if let Some(hit) = self.storage.lookup::<SerializableResponse>(&key).await {
            debug!(%key, partition = %hit.partition, "asset served from cache");
            metrics::record_cache_hit("static");
            return Ok(FetchResponse::from_cache(hit));
        }
        metrics::record_cache_miss("static");

        let destination = request.destination;
        match network.call(request).await {
            Ok(response) => {
                if response.is_success() {
                    let partition = self.storage.partitions().static_name();
                    self.storage
                        .put(partition, &key, &response.to_serializable())
                        .await;
                }
                Ok(response)
            }
            Err(error) => {
                metrics::record_network_failure("static");
                if destination == Destination::Image {
                    debug!(%key, %error, "image unavailable, serving placeholder");
                    metrics::record_offline_fallback("static");
                    Ok(fallback::placeholder_image())
                } else {
                    Err(error)
                }
            }
        }
    }
}
