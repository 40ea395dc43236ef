//! Event dispatch table.
//!
//! The table is built once when the worker starts. Each [`EventKind`] maps
//! to exactly one handler; events without a handler are rejected rather
//! than silently dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use haven_core::Upstream;
use haven_http::{FetchRequest, Network};
use tracing::debug;

use crate::error::DispatchError;
use crate::event::{Event, EventKind, EventOutcome};
use crate::handlers;
use crate::worker::WorkerContext;

/// Future returned by an event handler.
pub type HandlerFuture = BoxFuture<'static, Result<EventOutcome, DispatchError>>;

/// A registered event handler.
pub type EventHandler<N> =
    Arc<dyn Fn(Arc<WorkerContext<N>>, Event) -> HandlerFuture + Send + Sync>;

/// Maps event kinds to handlers.
pub struct EventRouter<N> {
    handlers: HashMap<EventKind, EventHandler<N>>,
}

impl<N> Clone for EventRouter<N> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<N> std::fmt::Debug for EventRouter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(EventKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("EventRouter").field("kinds", &kinds).finish()
    }
}

impl<N> EventRouter<N> {
    /// A table with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn on<F, Fut>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(Arc<WorkerContext<N>>, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EventOutcome, DispatchError>> + Send + 'static,
    {
        let handler: EventHandler<N> =
            Arc::new(move |ctx: Arc<WorkerContext<N>>, event: Event| -> HandlerFuture {
                Box::pin(handler(ctx, event))
            });
        self.handlers.insert(kind, handler);
        self
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Runs the handler registered for the event's kind.
    pub async fn dispatch(
        &self,
        ctx: Arc<WorkerContext<N>>,
        event: Event,
    ) -> Result<EventOutcome, DispatchError> {
        let kind = event.kind();
        let handler = self
            .handlers
            .get(&kind)
            .cloned()
            .ok_or(DispatchError::Unhandled(kind))?;
        debug!(%kind, "dispatching event");
        handler(ctx, event).await
    }
}

impl<N> EventRouter<N>
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    /// The standard table: every event kind wired to its worker handler.
    pub fn standard() -> Self {
        Self::empty()
            .on(EventKind::Install, handlers::install::<N>)
            .on(EventKind::Activate, handlers::activate::<N>)
            .on(EventKind::Fetch, handlers::fetch::<N>)
            .on(EventKind::Message, handlers::message::<N>)
            .on(EventKind::Sync, handlers::sync::<N>)
            .on(EventKind::Push, handlers::push::<N>)
            .on(EventKind::NotificationClick, handlers::notification_click::<N>)
            .on(EventKind::Connectivity, handlers::connectivity::<N>)
    }
}

impl<N> Default for EventRouter<N>
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    fn default() -> Self {
        Self::standard()
    }
}
