#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use haven::{Registration, WorkerConfig};
use haven_backend::{ActionLog, Storage};
use haven_core::Upstream;
use haven_feoxdb::FeOxDbActionLog;
use haven_http::{FetchError, FetchRequest, FetchResponse};
use haven_moka::MokaStorage;
use haven_worker::{ClientRegistry, NotificationCenter, Worker};
use http::StatusCode;

#[derive(Default)]
struct State {
    online: bool,
    hang: bool,
    routes: HashMap<String, (StatusCode, String)>,
    calls: Vec<String>,
}

/// A switchable fake network.
///
/// Offline calls fail, hanging calls never resolve, unknown URLs answer
/// `404`. Every call is recorded as `"METHOD url"`.
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

    pub fn set_online(&self, online: bool) {
        self.state.lock().unwrap().online = online;
    }

    pub fn set_hang(&self, hang: bool) {
        self.state.lock().unwrap().hang = hang;
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
}

impl Upstream<FetchRequest> for MockNetwork {
    type Response = Result<FetchResponse, FetchError>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, request: FetchRequest) -> Self::Future {
        let mut state = self.state.lock().unwrap();
        let url = request.url();
        state.calls.push(format!("{} {}", request.method, url));
        if state.hang {
            return Box::pin(futures::future::pending());
        }
        let outcome = if !state.online {
            Err(FetchError::Network("offline".into()))
        } else {
            Ok(match state.routes.get(&url) {
                Some((status, body)) => FetchResponse::new(*status, body.clone()),
                None => FetchResponse::new(StatusCode::NOT_FOUND, "not found"),
            })
        };
        Box::pin(futures::future::ready(outcome))
    }
}

pub fn config(version: &str) -> WorkerConfig {
    WorkerConfig {
        version: version.into(),
        cache_prefix: "tasks".into(),
        origin: "https://app.example".into(),
        ..WorkerConfig::default()
    }
}

/// A network that serves the default app shell and the task API.
pub fn network() -> MockNetwork {
    config("v1")
        .shell_urls()
        .iter()
        .fold(MockNetwork::online(), |network, url| network.route(url, 200, url))
        .route("https://app.example/api/tasks", 201, r#"{"id":7}"#)
}

pub struct Harness {
    pub registration: Arc<Registration>,
    pub storage: Arc<dyn Storage>,
    pub log: Arc<dyn ActionLog>,
    pub network: MockNetwork,
    pub notifications: Arc<NotificationCenter>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            registration: Arc::new(Registration::new()),
            storage: Arc::new(MokaStorage::new()),
            log: Arc::new(FeOxDbActionLog::in_memory().unwrap()),
            network: network(),
            notifications: Arc::new(NotificationCenter::new()),
        }
    }

    pub fn worker(&self, version: &str) -> Worker<MockNetwork> {
        Worker::new(
            config(version),
            self.registration.clone(),
            self.storage.clone(),
            self.log.clone(),
            self.network.clone(),
            self.notifications.clone(),
        )
        .unwrap()
    }

    /// A newer version serving the pages of `clients`.
    pub fn successor(&self, version: &str, clients: &ClientRegistry) -> Worker<MockNetwork> {
        Worker::with_client_registry(
            config(version),
            self.registration.clone(),
            self.storage.clone(),
            self.log.clone(),
            self.network.clone(),
            self.notifications.clone(),
            clients.clone(),
        )
        .unwrap()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
