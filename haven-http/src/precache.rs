//! App shell precaching.

use haven::WorkerError;
use haven_core::RequestKey;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::{FetchRequest, Network, SerializableResponse};

/// Fetches every app shell URL for installation.
///
/// All or nothing: the first transport failure or non-2xx answer fails the
/// whole install, and nothing fetched so far is returned.
pub async fn fetch_shell<N: Network>(
    version: &str,
    urls: &[String],
    network: &mut N,
) -> Result<Vec<(RequestKey, SerializableResponse)>, WorkerError> {
    let failed = |reason: String| WorkerError::InstallFailed {
        version: SmolStr::new(version),
        reason,
    };

    let mut entries = Vec::with_capacity(urls.len());
    for url in urls {
        let request = FetchRequest::get(url).map_err(|e| failed(e.to_string()))?;
        let key = request.key();
        let response = match network.call(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(url, %error, "shell fetch failed");
                return Err(failed(format!("{url}: {error}")));
            }
        };
        if !response.is_success() {
            warn!(url, status = %response.status, "shell fetch answered with error status");
            return Err(failed(format!("{url}: upstream answered {}", response.status)));
        }
        debug!(url, bytes = response.body.len(), "fetched shell entry");
        entries.push((key, response.to_serializable()));
    }
    Ok(entries)
}
