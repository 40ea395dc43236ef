//! Observable application state.
//!
//! One [`PwaStateController`] owns the state; UI layers hold
//! [`watch::Receiver`]s obtained from [`PwaStateController::observe`] and
//! never mutate it. Every change goes through [`PwaStateController::apply`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::lifecycle::{ClientMessage, WorkerMessage};

/// Snapshot of the app's installability, connectivity and update status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwaState {
    /// An install prompt is available.
    pub is_installable: bool,
    /// The app runs installed (standalone) or was just installed.
    pub is_installed: bool,
    /// The device has connectivity.
    pub is_online: bool,
    /// A newer worker version is waiting.
    pub update_available: bool,
    /// Version tag of the worker controlling this page, once registered.
    pub registration: Option<SmolStr>,
}

/// Everything that can change [`PwaState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PwaEvent {
    /// The platform offered an install prompt.
    InstallPromptAvailable,
    /// The install prompt was shown and answered. It cannot be shown again.
    InstallPromptAnswered {
        /// The user accepted the install.
        accepted: bool,
    },
    /// The app was installed.
    AppInstalled,
    /// The page started in standalone display mode.
    StandaloneLaunch,
    /// Connectivity came back.
    Online,
    /// Connectivity was lost.
    Offline,
    /// The worker registration resolved.
    Registered {
        /// Version tag of the controlling worker.
        version: SmolStr,
    },
    /// A message arrived from the worker.
    Worker(WorkerMessage),
}

impl From<WorkerMessage> for PwaEvent {
    fn from(message: WorkerMessage) -> Self {
        PwaEvent::Worker(message)
    }
}

/// Owner of the [`PwaState`].
///
/// Cloning is cheap: clones share the same state.
#[derive(Debug, Clone)]
pub struct PwaStateController {
    state: Arc<watch::Sender<PwaState>>,
}

impl PwaStateController {
    /// Creates the controller with the connectivity known at start-up.
    pub fn new(is_online: bool) -> Self {
        let (state, _) = watch::channel(PwaState {
            is_online,
            ..PwaState::default()
        });
        Self {
            state: Arc::new(state),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> PwaState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn observe(&self) -> watch::Receiver<PwaState> {
        self.state.subscribe()
    }

    /// Applies an event; returns whether the state changed.
    pub fn apply(&self, event: impl Into<PwaEvent>) -> bool {
        let event = event.into();
        let changed = self.state.send_if_modified(|state| {
            let before = state.clone();
            match &event {
                PwaEvent::InstallPromptAvailable => state.is_installable = !state.is_installed,
                PwaEvent::InstallPromptAnswered { .. } => state.is_installable = false,
                PwaEvent::AppInstalled | PwaEvent::StandaloneLaunch => {
                    state.is_installed = true;
                    state.is_installable = false;
                }
                PwaEvent::Online => state.is_online = true,
                PwaEvent::Offline => state.is_online = false,
                PwaEvent::Registered { version } => state.registration = Some(version.clone()),
                PwaEvent::Worker(WorkerMessage::UpdateAvailable { .. }) => {
                    state.update_available = true
                }
                PwaEvent::Worker(WorkerMessage::Activated { version }) => {
                    state.registration = Some(version.clone());
                    state.update_available = false;
                }
                PwaEvent::Worker(WorkerMessage::ActionReplayed { .. }) => {}
            }
            *state != before
        });
        if changed {
            debug!(?event, "pwa state changed");
        }
        changed
    }

    /// The user chose to update now.
    ///
    /// Clears the flag and returns the message to post to the waiting
    /// worker, or `None` when no update was pending.
    pub fn accept_update(&self) -> Option<ClientMessage> {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            accepted = state.update_available;
            state.update_available = false;
            accepted
        });
        accepted.then_some(ClientMessage::SkipWaiting)
    }

    /// Feeds worker messages into the state until the channel closes.
    pub fn follow(&self, mut messages: broadcast::Receiver<WorkerMessage>) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                match messages.recv().await {
                    Ok(message) => {
                        controller.apply(message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "state controller lagged behind worker messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn install_prompt_flow() {
        let controller = PwaStateController::new(true);
        assert!(controller.apply(PwaEvent::InstallPromptAvailable));
        assert!(controller.snapshot().is_installable);

        assert!(controller.apply(PwaEvent::InstallPromptAnswered { accepted: true }));
        assert!(controller.apply(PwaEvent::AppInstalled));
        assert_eq!(
            controller.snapshot(),
            PwaState {
                is_installable: false,
                is_installed: true,
                is_online: true,
                update_available: false,
                registration: None,
            }
        );
    }

    #[test]
    fn standalone_launch_is_never_installable() {
        let controller = PwaStateController::new(true);
        controller.apply(PwaEvent::StandaloneLaunch);
        assert!(!controller.apply(PwaEvent::InstallPromptAvailable));
        assert!(!controller.snapshot().is_installable);
    }

    #[test]
    fn repeated_event_reports_no_change() {
        let controller = PwaStateController::new(false);
        assert!(!controller.apply(PwaEvent::Offline));
        assert!(controller.apply(PwaEvent::Online));
        assert!(!controller.apply(PwaEvent::Online));
    }

    #[test]
    fn accept_update_only_once() {
        let controller = PwaStateController::new(true);
        assert_eq!(controller.accept_update(), None);

        controller.apply(WorkerMessage::UpdateAvailable { version: "v2".into() });
        assert!(controller.snapshot().update_available);
        assert_eq!(controller.accept_update(), Some(ClientMessage::SkipWaiting));
        assert!(!controller.snapshot().update_available);
        assert_eq!(controller.accept_update(), None);
    }

    #[tokio::test]
    async fn observers_see_worker_messages() {
        let controller = PwaStateController::new(true);
        let mut observer = controller.observe();
        let (tx, rx) = broadcast::channel(8);
        let task = controller.follow(rx);

        tx.send(WorkerMessage::Activated { version: "v3".into() }).unwrap();
        observer.changed().await.unwrap();
        assert_eq!(observer.borrow().registration.as_deref(), Some("v3"));

        drop(tx);
        task.await.unwrap();
    }
}
