//! Events delivered to the worker and what handling them produced.

use std::fmt;

use bytes::Bytes;
use haven::{DrainReport, Notification, WorkerState};
use haven_http::{FetchRequest, FetchResponse};
use serde_json::Value;

use crate::clients::ClientId;

/// Kind of a worker event, the key of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
    Sync,
    Push,
    NotificationClick,
    Connectivity,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Message => "message",
            EventKind::Sync => "sync",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
            EventKind::Connectivity => "connectivity",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered to the worker.
#[derive(Debug, Clone)]
pub enum Event {
    /// Fetch the app shell and install this version.
    Install,
    /// Activate this version if it is waiting.
    Activate,
    /// A page issued a request. `client` is `None` for requests without a
    /// page, such as navigations into a new window.
    Fetch {
        client: Option<ClientId>,
        request: FetchRequest,
    },
    /// A page posted a message.
    Message {
        client: Option<ClientId>,
        data: Value,
    },
    /// A background sync fired.
    Sync { tag: String },
    /// A push message arrived.
    Push { data: Bytes },
    /// The user clicked a notification or one of its actions.
    NotificationClick {
        notification: Notification,
        action: Option<String>,
    },
    /// Connectivity changed.
    Connectivity { online: bool },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch { .. } => EventKind::Fetch,
            Event::Message { .. } => EventKind::Message,
            Event::Sync { .. } => EventKind::Sync,
            Event::Push { .. } => EventKind::Push,
            Event::NotificationClick { .. } => EventKind::NotificationClick,
            Event::Connectivity { .. } => EventKind::Connectivity,
        }
    }
}

/// What handling an event produced.
#[derive(Debug)]
pub enum EventOutcome {
    /// Install finished; carries the state the version ended up in.
    Installed(WorkerState),
    Activated,
    /// A fetch was answered.
    Response(FetchResponse),
    /// A `SKIP_WAITING` message was handled; `true` when it activated the
    /// waiting version.
    SkippedWaiting(bool),
    /// The offline queue was drained.
    Drained(DrainReport),
    /// A notification was shown.
    Notified(Notification),
    /// An open page was focused and navigated.
    Focused(ClientId),
    /// A new window was opened.
    Opened(ClientId),
    /// The event needed no action.
    Ignored,
}
