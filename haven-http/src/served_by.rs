//! Marker for responses served from a cache partition.

use http::HeaderValue;
use http::header::HeaderName;

use crate::FetchResponse;

/// Header set on API responses that were read from a cache partition.
pub const SERVED_BY_HEADER: HeaderName = HeaderName::from_static("x-served-by");

/// Value of [`SERVED_BY_HEADER`] for cache-served responses.
pub const SERVED_BY_CACHE: &str = "cache";

impl FetchResponse {
    /// Marks the response as served from cache.
    pub fn mark_served_by_cache(&mut self) {
        self.headers
            .insert(SERVED_BY_HEADER, HeaderValue::from_static(SERVED_BY_CACHE));
    }

    /// Whether the response carries the cache marker.
    pub fn is_served_by_cache(&self) -> bool {
        self.headers
            .get(&SERVED_BY_HEADER)
            .is_some_and(|v| v.as_bytes() == SERVED_BY_CACHE.as_bytes())
    }
}
