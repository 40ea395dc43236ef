//! Responses synthesized when neither network nor cache can answer.

use haven::Messages;
use http::StatusCode;
use serde::Serialize;

use crate::FetchResponse;

/// Placeholder for images that are neither cached nor reachable.
pub const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200">"##,
    r##"<rect width="200" height="200" fill="#f3f4f6"/>"##,
    r##"<path d="M70 130l25-30 20 22 15-17 25 25H70z" fill="#9ca3af"/>"##,
    r##"<circle cx="80" cy="80" r="10" fill="#9ca3af"/>"##,
    "</svg>"
);

#[derive(Serialize)]
struct OfflineBody<'a> {
    error: &'a str,
    offline: bool,
}

/// `503` plain-text page telling the user they are offline.
pub fn offline_page(messages: &Messages) -> FetchResponse {
    FetchResponse::synthesized(
        StatusCode::SERVICE_UNAVAILABLE,
        "text/plain; charset=utf-8",
        messages.page_offline.clone(),
    )
}

/// `503` JSON body `{"error": ..., "offline": true}` for API callers.
pub fn offline_json(messages: &Messages) -> FetchResponse {
    let body = serde_json::to_vec(&OfflineBody {
        error: &messages.api_offline,
        offline: true,
    })
    .unwrap_or_else(|_| br#"{"offline":true}"#.to_vec());
    FetchResponse::synthesized(
        StatusCode::SERVICE_UNAVAILABLE,
        "application/json; charset=utf-8",
        body,
    )
}

/// Inline SVG standing in for a missing image.
pub fn placeholder_image() -> FetchResponse {
    FetchResponse::synthesized(StatusCode::OK, "image/svg+xml", PLACEHOLDER_SVG)
}
