//! Per-class caching strategies.
//!
//! | Class | Strategy | Writes to | Offline answer |
//! |-------|----------|-----------|----------------|
//! | page | [`NetworkFirst`] | dynamic, 2xx/3xx | cached copy, else `503` text |
//! | API | [`ApiStrategy`] | dynamic, `GET` 2xx | cached copy marked `x-served-by: cache`, else `503` JSON |
//! | static | [`CacheFirst`] | static, 2xx | placeholder SVG for images, else the error |

mod api;
mod cache_first;
mod network_first;

pub use api::ApiStrategy;
pub use cache_first::CacheFirst;
pub use network_first::NetworkFirst;
