//! Open pages and their lifetimes.
//!
//! Every page the worker serves is a client. Closing a client cancels every
//! fetch it still has in flight: the registry hands out a
//! [`CancellationToken`] per client and trips it on [`close`](ClientRegistry::close).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use smol_str::SmolStr;
use tokio::sync::watch;
use tracing::debug;

/// Identifier of an open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Snapshot of an open page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: ClientId,
    pub url: String,
    pub focused: bool,
    /// Worker version controlling the page, if any.
    pub controller: Option<SmolStr>,
}

#[derive(Debug)]
struct ClientEntry {
    url: String,
    focused: bool,
    controller: Option<SmolStr>,
    closed: watch::Sender<bool>,
}

impl ClientEntry {
    fn info(&self, id: ClientId) -> ClientInfo {
        ClientInfo {
            id,
            url: self.url.clone(),
            focused: self.focused,
            controller: self.controller.clone(),
        }
    }
}

/// Trips when the client it belongs to is closed.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    closed: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the client is closed.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.closed.borrow_and_update() {
                return;
            }
            if self.closed.changed().await.is_err() {
                // registry entry dropped
                return;
            }
        }
    }
}

#[derive(Debug, Default)]
struct ClientRegistryInner {
    clients: DashMap<ClientId, ClientEntry>,
    next_id: AtomicU64,
}

/// The set of open pages.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<ClientRegistryInner>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page opened at `url`.
    pub fn open(&self, url: impl Into<String>, controller: Option<SmolStr>) -> ClientId {
        let id = ClientId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (closed, _) = watch::channel(false);
        let url = url.into();
        debug!(%id, %url, "client opened");
        self.inner.clients.insert(
            id,
            ClientEntry {
                url,
                focused: false,
                controller,
                closed,
            },
        );
        id
    }

    /// Closes a page and cancels its in-flight fetches.
    ///
    /// Returns `false` when the client was not open.
    pub fn close(&self, id: ClientId) -> bool {
        match self.inner.clients.remove(&id) {
            Some((_, entry)) => {
                entry.closed.send_replace(true);
                debug!(%id, "client closed");
                true
            }
            None => false,
        }
    }

    /// Cancellation token of an open client.
    pub fn token(&self, id: ClientId) -> Option<CancellationToken> {
        self.inner.clients.get(&id).map(|entry| CancellationToken {
            closed: entry.closed.subscribe(),
        })
    }

    pub fn get(&self, id: ClientId) -> Option<ClientInfo> {
        self.inner.clients.get(&id).map(|entry| entry.info(id))
    }

    /// Every open client, oldest first.
    pub fn all(&self) -> Vec<ClientInfo> {
        let mut clients: Vec<_> = self
            .inner
            .clients
            .iter()
            .map(|entry| entry.value().info(*entry.key()))
            .collect();
        clients.sort_by_key(|client| client.id);
        clients
    }

    pub fn len(&self) -> usize {
        self.inner.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.clients.is_empty()
    }

    /// Focuses a client, optionally navigating it to `url`.
    pub fn focus(&self, id: ClientId, url: Option<&str>) -> Option<ClientInfo> {
        if !self.inner.clients.contains_key(&id) {
            return None;
        }
        for mut entry in self.inner.clients.iter_mut() {
            let target = *entry.key() == id;
            entry.focused = target;
            if target && let Some(url) = url {
                entry.url = url.to_owned();
            }
        }
        self.get(id)
    }

    /// Opens a new focused window at `url`.
    pub fn open_window(&self, url: &str, controller: Option<SmolStr>) -> ClientId {
        let id = self.open(url, controller);
        self.focus(id, None);
        id
    }

    /// Makes `version` the controller of every open client.
    ///
    /// Returns how many clients changed controller.
    pub fn claim(&self, version: &SmolStr) -> usize {
        let mut claimed = 0;
        for mut entry in self.inner.clients.iter_mut() {
            if entry.controller.as_ref() != Some(version) {
                entry.controller = Some(version.clone());
                claimed += 1;
            }
        }
        claimed
    }
}
