//! Request classification.
//!
//! Every intercepted request is routed exactly once. Cross-origin requests
//! pass through untouched unless they target a configured backend host;
//! the rest are split into three classes by destination and URL.

use std::fmt;

use haven::WorkerConfig;
use http::Uri;

use crate::{Destination, FetchError, FetchRequest};

/// Caching class of a same-origin request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Navigations: network first, offline page as last resort.
    Page,
    /// API calls: network first, cached `GET`s when offline.
    Api,
    /// Everything else: cache first.
    Static,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Page => "page",
            RequestClass::Api => "api",
            RequestClass::Static => "static",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the worker does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward to the network, never cache.
    PassThrough,
    /// Handle with the class strategy.
    Intercept(RequestClass),
}

impl Route {
    /// The class of an intercepted request.
    pub fn class(&self) -> Option<RequestClass> {
        match self {
            Route::PassThrough => None,
            Route::Intercept(class) => Some(*class),
        }
    }
}

/// Scheme, host and port of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
    port: u16,
}

impl Origin {
    /// Origin of an absolute URI; `None` for relative ones.
    pub fn of(uri: &Uri) -> Option<Self> {
        let scheme = uri.scheme_str()?.to_ascii_lowercase();
        let host = uri.host()?.to_ascii_lowercase();
        let port = uri.port_u16().unwrap_or(match scheme.as_str() {
            "https" | "wss" => 443,
            _ => 80,
        });
        Some(Self { scheme, host, port })
    }

    /// Parses an origin such as `https://app.example`.
    pub fn parse(origin: &str) -> Result<Self, FetchError> {
        let uri = origin
            .parse::<Uri>()
            .map_err(|e| FetchError::InvalidRequest(format!("{origin}: {e}")))?;
        Self::of(&uri)
            .ok_or_else(|| FetchError::InvalidRequest(format!("{origin}: not an absolute origin")))
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Routes requests into [`RequestClass`]es.
#[derive(Debug, Clone)]
pub struct Router {
    origin: Origin,
    api_prefixes: Vec<String>,
    backend_hosts: Vec<String>,
}

impl Router {
    /// Creates a router for `origin`.
    pub fn new(
        origin: Origin,
        api_prefixes: impl IntoIterator<Item = impl Into<String>>,
        backend_hosts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            origin,
            api_prefixes: api_prefixes.into_iter().map(Into::into).collect(),
            backend_hosts: backend_hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Creates the router described by a worker configuration.
    pub fn from_config(config: &WorkerConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            Origin::parse(&config.origin)?,
            config.api_prefixes.iter().cloned(),
            config.backend_hosts.iter().cloned(),
        ))
    }

    /// Origin the app is served from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    fn is_backend_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.backend_hosts.iter().any(|backend| {
            host == *backend
                || host
                    .strip_suffix(backend.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Decides whether and how the worker handles `request`.
    pub fn route(&self, request: &FetchRequest) -> Route {
        match Origin::of(&request.uri) {
            Some(origin) if origin != self.origin => {
                if self.is_backend_host(origin.host()) {
                    Route::Intercept(RequestClass::Api)
                } else {
                    Route::PassThrough
                }
            }
            _ => Route::Intercept(self.classify(request)),
        }
    }

    /// Classifies a request by destination and URL.
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        if request.destination == Destination::Document {
            return RequestClass::Page;
        }
        let path = request.uri.path();
        let on_backend = request.uri.host().is_some_and(|h| self.is_backend_host(h));
        if on_backend || self.api_prefixes.iter().any(|p| path.contains(p.as_str())) {
            RequestClass::Api
        } else {
            RequestClass::Static
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let config = WorkerConfig {
            origin: "https://app.example".into(),
            backend_hosts: vec!["db.backend.example".into()],
            ..WorkerConfig::default()
        };
        Router::from_config(&config).unwrap()
    }

    fn request(url: &str, destination: Destination) -> FetchRequest {
        FetchRequest::get(url).unwrap().destination(destination)
    }

    #[test]
    fn documents_are_pages() {
        let r = request("https://app.example/projects/3", Destination::Document);
        assert_eq!(router().route(&r), Route::Intercept(RequestClass::Page));
    }

    #[test]
    fn api_prefixes_and_backend_hosts_are_api() {
        let router = router();
        for url in [
            "https://app.example/api/tasks",
            "https://app.example/api/apartments/12?expand=floor",
            "https://db.backend.example/rest/v1/tasks",
            "https://eu.db.backend.example/rest/v1/tasks",
        ] {
            let r = request(url, Destination::Empty);
            assert_eq!(router.route(&r), Route::Intercept(RequestClass::Api), "{url}");
        }
    }

    #[test]
    fn other_same_origin_requests_are_static() {
        let router = router();
        for (url, destination) in [
            ("https://app.example/assets/app.js", Destination::Script),
            ("https://app.example/icons/icon-192x192.png", Destination::Image),
            ("https://app.example/api/users", Destination::Empty),
        ] {
            let r = request(url, destination);
            assert_eq!(router.route(&r), Route::Intercept(RequestClass::Static), "{url}");
        }
    }

    #[test]
    fn cross_origin_passes_through() {
        let router = router();
        for url in [
            "https://fonts.example/inter.woff2",
            "http://app.example/",
            "https://app.example:8443/",
            "https://notdb.backend.example.evil/",
        ] {
            let r = request(url, Destination::Empty);
            assert_eq!(router.route(&r), Route::PassThrough, "{url}");
        }
    }

    #[test]
    fn default_port_matches_origin() {
        let r = request("https://app.example:443/api/floors", Destination::Empty);
        assert_eq!(router().route(&r), Route::Intercept(RequestClass::Api));
    }

    #[test]
    fn bad_origin_is_rejected() {
        assert!(Origin::parse("/relative").is_err());
    }
}
