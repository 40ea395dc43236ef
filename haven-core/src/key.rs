//! Request identity used as the cache key.
//!
//! A cached response is found again by the method and absolute URL of the
//! request that produced it. The request body never takes part in the
//! identity, and neither does the URL fragment, which the network never sees.
//!
//! ```
//! use haven_core::RequestKey;
//!
//! let key = RequestKey::new("get", "https://app.example/api/tasks#top");
//! assert_eq!(key.method(), "GET");
//! assert_eq!(key.url(), "https://app.example/api/tasks");
//! assert_eq!(key.to_string(), "GET https://app.example/api/tasks");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identity of a request inside a cache partition.
///
/// Two requests with the same method and URL map to the same entry, so a
/// later write for the same identity overwrites the earlier one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    method: SmolStr,
    url: SmolStr,
}

impl RequestKey {
    /// Creates a key from a method and an absolute URL.
    ///
    /// The method is upper-cased and any `#fragment` is dropped from the URL.
    pub fn new(method: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        let url = url.as_ref();
        let url = url.split_once('#').map_or(url, |(head, _)| head);
        RequestKey {
            method: SmolStr::new(method.as_ref().to_ascii_uppercase()),
            url: SmolStr::new(url),
        }
    }

    /// Shorthand for a `GET` key, the only method cache partitions serve.
    pub fn get(url: impl AsRef<str>) -> Self {
        Self::new("GET", url)
    }

    /// Returns the upper-cased request method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the URL without fragment.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether this identity belongs to a `GET` request.
    #[inline]
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
