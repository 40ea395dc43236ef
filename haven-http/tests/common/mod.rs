#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Ready;
use std::sync::{Arc, Mutex};

use haven::{CacheStorage, WorkerConfig};
use haven_core::Upstream;
use haven_http::{FetchError, FetchRequest, FetchResponse};
use haven_moka::MokaStorage;
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};

#[derive(Default)]
struct State {
    online: bool,
    routes: HashMap<String, (StatusCode, String)>,
    calls: Vec<String>,
}

/// A switchable fake network.
///
/// Known URLs answer with their scripted status and body, unknown URLs with
/// `404`. Offline, every call fails with [`FetchError::Network`]. Calls are
/// recorded as `"METHOD url"` either way.
#[derive(Clone, Default)]
pub struct MockNetwork {
    state: Arc<Mutex<State>>,
}

impl MockNetwork {
    pub fn online() -> Self {
        let network = Self::default();
        network.set_online(true);
        network
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.state.lock().unwrap().online = online;
    }

    pub fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.state.lock().unwrap().routes.insert(
            url.to_owned(),
            (StatusCode::from_u16(status).unwrap(), body.to_owned()),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

impl Upstream<FetchRequest> for MockNetwork {
    type Response = Result<FetchResponse, FetchError>;
    type Future = Ready<Self::Response>;

    fn call(&mut self, request: FetchRequest) -> Self::Future {
        let mut state = self.state.lock().unwrap();
        let url = request.url();
        state.calls.push(format!("{} {}", request.method, url));
        if !state.online {
            return std::future::ready(Err(FetchError::Network("offline".into())));
        }
        let response = match state.routes.get(&url) {
            Some((status, body)) => FetchResponse::new(*status, body.clone())
                .header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
            None => FetchResponse::new(StatusCode::NOT_FOUND, "not found"),
        };
        std::future::ready(Ok(response))
    }
}

pub fn config(version: &str) -> WorkerConfig {
    WorkerConfig {
        version: version.into(),
        cache_prefix: "tasks".into(),
        origin: "https://app.example".into(),
        backend_hosts: vec!["db.backend.example".into()],
        ..WorkerConfig::default()
    }
}

pub fn storage(config: &WorkerConfig) -> CacheStorage {
    CacheStorage::new(Arc::new(MokaStorage::new()), config.partitions())
}

pub fn body(response: &FetchResponse) -> String {
    String::from_utf8(response.body.to_vec()).unwrap()
}
