use bytes::Bytes;
use haven::OfflineAction;
use haven_core::RequestKey;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::FetchError;

/// What the page is going to do with the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A top-level or nested document (navigation).
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    /// `fetch()`/XHR calls and anything else.
    #[default]
    Empty,
}

impl Destination {
    /// Parses a platform destination label (`"document"`, `"image"`, ...).
    pub fn parse(label: &str) -> Self {
        match label {
            "document" | "iframe" | "frame" => Destination::Document,
            "image" => Destination::Image,
            "script" | "worker" | "sharedworker" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            _ => Destination::Empty,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Image => "image",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Font => "font",
            Destination::Manifest => "manifest",
            Destination::Empty => "",
        }
    }
}

/// A request intercepted from a page.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub destination: Destination,
}

impl FetchRequest {
    /// Creates a request with no headers or body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            destination: Destination::Empty,
        }
    }

    /// Parses `url` into a `GET` request.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        Ok(Self::new(Method::GET, parse_uri(url)?))
    }

    /// Parses `url` into a request with the given method.
    pub fn with_method(method: &str, url: &str) -> Result<Self, FetchError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
        Ok(Self::new(method, parse_uri(url)?))
    }

    /// Sets the destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The URL as a string.
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.as_str(), self.url())
    }

    /// Whether this is a `GET` request.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Captures the request so it can be replayed later.
    pub fn to_offline_action(&self) -> OfflineAction {
        let mut action = OfflineAction::new(self.method.as_str(), self.url()).body(self.body.clone());
        for (name, value) in &self.headers {
            action = action.header(name.as_str(), value.as_bytes());
        }
        action
    }
}

impl TryFrom<&OfflineAction> for FetchRequest {
    type Error = FetchError;

    fn try_from(action: &OfflineAction) -> Result<Self, Self::Error> {
        let mut request = FetchRequest::with_method(&action.method, &action.url)?;
        for (name, value) in &action.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
            let value = HeaderValue::from_bytes(value)
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
            request.headers.append(name, value);
        }
        request.body = action.body.clone();
        Ok(request)
    }
}

fn parse_uri(url: &str) -> Result<Uri, FetchError> {
    url.parse::<Uri>()
        .map_err(|e| FetchError::InvalidRequest(format!("{url}: {e}")))
}
