use bytes::Bytes;
use haven::CacheHit;
use haven_core::ResponseSource;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A response handed back to a page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Where the response came from.
    pub source: ResponseSource,
}

impl FetchResponse {
    /// A network response.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            source: ResponseSource::Network,
        }
    }

    /// Builds a response synthesized by the worker.
    pub fn synthesized(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let mut response = Self::new(status, body);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response.source = ResponseSource::Synthesized;
        response
    }

    /// Adds a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Rebuilds a response read from a cache partition.
    pub fn from_cache(hit: CacheHit<SerializableResponse>) -> Self {
        let mut response = FetchResponse::from(hit.entry.into_inner());
        response.source = ResponseSource::Cache(hit.partition);
        response
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Value of the `content-type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Snapshot suitable for a cache partition.
    pub fn to_serializable(&self) -> SerializableResponse {
        SerializableResponse::from(self)
    }
}

/// Response snapshot stored in cache partitions.
///
/// Headers keep their original order and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableResponse {
    pub status: u16,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Bytes,
}

impl From<&FetchResponse> for SerializableResponse {
    fn from(response: &FetchResponse) -> Self {
        Self {
            status: response.status.as_u16(),
            headers: response
                .headers
                .iter()
                .map(|(name, value)| (name.as_str().to_owned(), value.as_bytes().to_vec()))
                .collect(),
            body: response.body.clone(),
        }
    }
}

impl From<SerializableResponse> for FetchResponse {
    fn from(snapshot: SerializableResponse) -> Self {
        let status = StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::OK);
        let mut headers = HeaderMap::with_capacity(snapshot.headers.len());
        for (name, value) in snapshot.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => debug!(header = %name, "dropping unparsable cached header"),
            }
        }
        FetchResponse {
            status,
            headers,
            body: snapshot.body,
            source: ResponseSource::Network,
        }
    }
}
