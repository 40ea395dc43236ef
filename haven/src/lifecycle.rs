//! Worker lifecycle.
//!
//! A [`Registration`] is shared by every version of the worker serving one
//! app. It has three slots: the version being installed, the version waiting
//! to take over, and the active version. Each version drives its own
//! [`Lifecycle`]:
//!
//! ```text
//! Parsed -> Installing -> Installed (waiting) -> Activating -> Active
//!               |                                                |
//!               +--------------> Redundant <---------------------+
//! ```
//!
//! A version installed while nothing is active activates at once. Otherwise
//! it waits, [`WorkerMessage::UpdateAvailable`] is broadcast to open pages,
//! and it takes over only after a [`ClientMessage::SkipWaiting`].

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use haven_core::RequestKey;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tokio::sync::{broadcast, watch};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::WorkerError;
use crate::storage::CacheStorage;

const MESSAGE_CAPACITY: usize = 64;

/// Lifecycle state of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Created, install not started.
    Parsed,
    /// Fetching the app shell.
    Installing,
    /// Shell committed, waiting to take over.
    Installed,
    /// Pruning stale partitions.
    Activating,
    /// Serving requests for every open page.
    Active,
    /// Failed to install or replaced by a newer version.
    Redundant,
}

impl WorkerState {
    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message from the worker to every open page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// A new version is installed and waiting.
    UpdateAvailable {
        /// Version tag of the waiting worker.
        version: SmolStr,
    },
    /// A version took control of the open pages.
    Activated {
        /// Version tag of the now active worker.
        version: SmolStr,
    },
    /// A queued offline action reached the backend.
    ActionReplayed {
        /// Queue id of the action.
        id: u64,
        /// Target URL of the action.
        url: String,
    },
}

/// Message from a page to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Activate the waiting version now.
    SkipWaiting,
}

/// One worker version as seen by the registration.
#[derive(Debug)]
struct WorkerHandle {
    version: SmolStr,
    state: watch::Sender<WorkerState>,
}

impl WorkerHandle {
    fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    fn set(&self, state: WorkerState) {
        debug!(version = %self.version, %state, "worker state changed");
        self.state.send_replace(state);
    }
}

#[derive(Debug, Default)]
struct Slots {
    installing: Option<Arc<WorkerHandle>>,
    waiting: Option<Arc<WorkerHandle>>,
    active: Option<Arc<WorkerHandle>>,
}

/// Registration shared by all versions of the worker.
#[derive(Debug)]
pub struct Registration {
    slots: Mutex<Slots>,
    messages: broadcast::Sender<WorkerMessage>,
}

impl Default for Registration {
    fn default() -> Self {
        Self::new()
    }
}

impl Registration {
    /// Creates an empty registration.
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(MESSAGE_CAPACITY);
        Self {
            slots: Mutex::new(Slots::default()),
            messages,
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Version tag currently being installed.
    pub fn installing(&self) -> Option<SmolStr> {
        self.slots().installing.as_ref().map(|h| h.version.clone())
    }

    /// Version tag waiting to take over.
    pub fn waiting(&self) -> Option<SmolStr> {
        self.slots().waiting.as_ref().map(|h| h.version.clone())
    }

    /// Version tag controlling the open pages.
    pub fn active(&self) -> Option<SmolStr> {
        self.slots().active.as_ref().map(|h| h.version.clone())
    }

    /// Subscribes to worker messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerMessage> {
        self.messages.subscribe()
    }

    /// Broadcasts a message to every subscriber.
    pub fn post(&self, message: WorkerMessage) {
        // no subscribers is fine: nobody is listening yet
        let _ = self.messages.send(message);
    }
}

/// Lifecycle of one worker version.
pub struct Lifecycle {
    handle: Arc<WorkerHandle>,
    registration: Arc<Registration>,
    storage: CacheStorage,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("version", &self.handle.version)
            .field("state", &self.handle.state())
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    /// Creates the lifecycle of `version` within `registration`.
    pub fn new(
        version: impl AsRef<str>,
        registration: Arc<Registration>,
        storage: CacheStorage,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Parsed);
        Self {
            handle: Arc::new(WorkerHandle {
                version: SmolStr::new(version.as_ref()),
                state,
            }),
            registration,
            storage,
        }
    }

    /// Version tag of this worker.
    pub fn version(&self) -> &str {
        &self.handle.version
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        self.handle.state()
    }

    /// Watches state changes.
    pub fn watch(&self) -> watch::Receiver<WorkerState> {
        self.handle.state.subscribe()
    }

    /// Registration this version belongs to.
    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    /// Cache store of this version.
    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    fn invalid(&self, to: WorkerState) -> WorkerError {
        WorkerError::InvalidTransition {
            version: self.handle.version.clone(),
            from: self.state(),
            to,
        }
    }

    /// Installs this version.
    ///
    /// `precache` fetches the app shell; its entries are committed to the
    /// static partition only when every one of them was fetched. Any failure
    /// leaves the version `Redundant` with nothing committed.
    ///
    /// On success the version activates immediately when nothing is active,
    /// and otherwise waits and announces the update. Returns the state the
    /// version ended up in.
    pub async fn install<T, F>(&self, precache: F) -> Result<WorkerState, WorkerError>
    where
        T: Serialize + Sync,
        F: Future<Output = Result<Vec<(RequestKey, T)>, WorkerError>>,
    {
        if self.state() != WorkerState::Parsed {
            return Err(self.invalid(WorkerState::Installing));
        }
        let span = info_span!("haven.install", version = %self.handle.version);
        async move {
            {
                let mut slots = self.registration.slots();
                if let Some(previous) = slots.installing.replace(self.handle.clone()) {
                    previous.set(WorkerState::Redundant);
                }
            }
            self.handle.set(WorkerState::Installing);

            let committed = match precache.await {
                Ok(entries) => {
                    let partition = self.storage.partitions().static_name().to_owned();
                    self.storage
                        .commit(&partition, &entries)
                        .await
                        .map(|()| entries.len())
                }
                Err(error) => Err(error),
            };

            let entries = match committed {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(%error, "install failed");
                    self.fail_install();
                    return Err(error);
                }
            };
            info!(entries, "app shell cached");

            let has_active = {
                let mut slots = self.registration.slots();
                if !slots
                    .installing
                    .as_ref()
                    .is_some_and(|h| Arc::ptr_eq(h, &self.handle))
                {
                    // superseded by a newer install while fetching
                    return Err(self.invalid(WorkerState::Installed));
                }
                slots.installing = None;
                if let Some(previous) = slots.waiting.replace(self.handle.clone()) {
                    previous.set(WorkerState::Redundant);
                }
                self.handle.set(WorkerState::Installed);
                slots.active.is_some()
            };

            if has_active {
                info!("installed, waiting for open pages to release the old version");
                self.registration.post(WorkerMessage::UpdateAvailable {
                    version: self.handle.version.clone(),
                });
            } else {
                self.activate().await?;
            }
            Ok(self.state())
        }
        .instrument(span)
        .await
    }

    fn fail_install(&self) {
        let mut slots = self.registration.slots();
        if slots
            .installing
            .as_ref()
            .is_some_and(|h| Arc::ptr_eq(h, &self.handle))
        {
            slots.installing = None;
        }
        self.handle.set(WorkerState::Redundant);
    }

    /// Activates this version.
    ///
    /// Only a waiting (`Installed`) version can activate. Every partition
    /// that does not belong to this version is deleted, the previous active
    /// version becomes `Redundant` and [`WorkerMessage::Activated`] is
    /// broadcast so open pages can be claimed.
    pub async fn activate(&self) -> Result<(), WorkerError> {
        {
            let slots = self.registration.slots();
            let waiting = slots
                .waiting
                .as_ref()
                .is_some_and(|h| Arc::ptr_eq(h, &self.handle));
            if !waiting || self.state() != WorkerState::Installed {
                return Err(self.invalid(WorkerState::Activating));
            }
            self.handle.set(WorkerState::Activating);
        }

        let span = info_span!("haven.activate", version = %self.handle.version);
        async move {
            let current = self.storage.partitions().current();
            match self.storage.delete_stale(&current).await {
                Ok(deleted) if !deleted.is_empty() => {
                    info!(?deleted, "deleted stale partitions")
                }
                Ok(_) => {}
                Err(error) => warn!(%error, "pruning stale partitions failed"),
            }

            {
                let mut slots = self.registration.slots();
                if slots
                    .waiting
                    .as_ref()
                    .is_some_and(|h| Arc::ptr_eq(h, &self.handle))
                {
                    slots.waiting = None;
                }
                if let Some(previous) = slots.active.replace(self.handle.clone()) {
                    previous.set(WorkerState::Redundant);
                }
                self.handle.set(WorkerState::Active);
            }
            info!("activated");
            self.registration.post(WorkerMessage::Activated {
                version: self.handle.version.clone(),
            });
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Handles `SKIP_WAITING`: activates this version if it is waiting.
    ///
    /// Returns whether activation happened; any other state is a no-op.
    pub async fn skip_waiting(&self) -> Result<bool, WorkerError> {
        if self.state() != WorkerState::Installed {
            debug!(version = %self.handle.version, state = %self.state(), "skip waiting ignored");
            return Ok(false);
        }
        self.activate().await?;
        Ok(true)
    }
}
