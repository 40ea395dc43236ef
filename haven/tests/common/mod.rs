#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Ready;
use std::sync::{Arc, Mutex};

use haven::{OfflineAction, Upstream};
use haven_core::RequestKey;

/// Replays offline actions against a script of outcomes.
///
/// Every call is recorded as `"METHOD url"`. When the script runs out, calls
/// succeed.
#[derive(Clone, Default)]
pub struct ScriptedReplay {
    outcomes: Arc<Mutex<VecDeque<Result<(), String>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedReplay {
    pub fn new(outcomes: impl IntoIterator<Item = Result<(), String>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Upstream<OfflineAction> for ScriptedReplay {
    type Response = Result<(), String>;
    type Future = Ready<Self::Response>;

    fn call(&mut self, action: OfflineAction) -> Self::Future {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", action.method, action.url));
        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        std::future::ready(outcome)
    }
}

pub fn shell_entry(path: &str) -> (RequestKey, String) {
    (
        RequestKey::get(format!("https://app.example{path}")),
        format!("contents of {path}"),
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
