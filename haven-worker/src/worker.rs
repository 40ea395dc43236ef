use std::sync::Arc;

use bytes::Bytes;
use haven::{
    CacheStorage, Lifecycle, Notification, Notifier, OfflineQueue, Registration, WorkerConfig,
};
use haven_backend::{ActionLog, Storage};
use haven_core::Upstream;
use haven_http::{FetchHandler, FetchRequest, FetchResponse, Network};
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};

use crate::clients::{ClientId, ClientRegistry};
use crate::dispatch::EventRouter;
use crate::error::DispatchError;
use crate::event::{Event, EventKind, EventOutcome};

/// Everything an event handler can reach.
pub struct WorkerContext<N> {
    pub config: Arc<WorkerConfig>,
    pub lifecycle: Lifecycle,
    pub handler: FetchHandler,
    pub queue: OfflineQueue,
    pub clients: ClientRegistry,
    pub notifier: Arc<dyn Notifier>,
    network: N,
}

impl<N> std::fmt::Debug for WorkerContext<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("version", &self.config.version)
            .field("state", &self.lifecycle.state())
            .field("queue", &self.queue)
            .field("clients", &self.clients.len())
            .finish_non_exhaustive()
    }
}

impl<N: Clone> WorkerContext<N> {
    /// A handle on the network for one event.
    pub fn network(&self) -> N {
        self.network.clone()
    }
}

impl<N> WorkerContext<N> {
    /// Resolves a root-relative URL against the app origin.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{url}", self.config.origin.trim_end_matches('/'))
        } else {
            url.to_owned()
        }
    }
}

/// One worker version, ready to receive events.
///
/// ```rust,ignore
/// let worker = Worker::new(config, registration, storage, log, network, notifier)?;
/// worker.install().await?;
///
/// let page = worker.open_client("https://app.example/");
/// let response = worker
///     .fetch(Some(page), FetchRequest::get("https://app.example/api/tasks")?)
///     .await?;
/// ```
pub struct Worker<N> {
    context: Arc<WorkerContext<N>>,
    router: EventRouter<N>,
}

impl<N> std::fmt::Debug for Worker<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("context", &self.context)
            .field("router", &self.router)
            .finish()
    }
}

impl<N> Worker<N>
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    /// Assembles a worker with the standard event table.
    pub fn new(
        config: WorkerConfig,
        registration: Arc<Registration>,
        storage: Arc<dyn Storage>,
        log: Arc<dyn ActionLog>,
        network: N,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DispatchError> {
        Self::with_client_registry(
            config,
            registration,
            storage,
            log,
            network,
            notifier,
            ClientRegistry::new(),
        )
    }

    /// Assembles a worker that serves the pages of an existing registry.
    ///
    /// Versions of one registration serve the same pages; a newer version
    /// is built with the client registry of the one it replaces.
    pub fn with_client_registry(
        config: WorkerConfig,
        registration: Arc<Registration>,
        storage: Arc<dyn Storage>,
        log: Arc<dyn ActionLog>,
        network: N,
        notifier: Arc<dyn Notifier>,
        clients: ClientRegistry,
    ) -> Result<Self, DispatchError> {
        let cache = CacheStorage::new(storage, config.partitions());
        let handler = FetchHandler::from_config(&config, cache.clone())?;
        let lifecycle = Lifecycle::new(config.version.as_str(), registration, cache);
        let queue = OfflineQueue::new(log, config.retry);
        info!(version = %config.version, clients = clients.len(), "worker parsed");
        Ok(Self {
            context: Arc::new(WorkerContext {
                config: Arc::new(config),
                lifecycle,
                handler,
                queue,
                clients,
                notifier,
                network,
            }),
            router: EventRouter::standard(),
        })
    }

    /// Replaces the event table.
    pub fn with_router(mut self, router: EventRouter<N>) -> Self {
        self.router = router;
        self
    }
}

impl<N> Worker<N> {
    pub fn context(&self) -> &Arc<WorkerContext<N>> {
        &self.context
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.context.lifecycle
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.context.queue
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.context.clients
    }

    /// Delivers one event.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, DispatchError> {
        let span = info_span!(
            "haven.event",
            kind = %event.kind(),
            version = %self.context.config.version,
        );
        self.router
            .dispatch(self.context.clone(), event)
            .instrument(span)
            .await
    }

    /// Registers a page opened at `url`, controlled by the active version.
    pub fn open_client(&self, url: impl Into<String>) -> ClientId {
        let controller = self.context.lifecycle.registration().active();
        self.context.clients.open(url, controller)
    }

    /// Closes a page, cancelling its in-flight fetches.
    pub fn close_client(&self, id: ClientId) -> bool {
        self.context.clients.close(id)
    }

    pub async fn install(&self) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Install).await
    }

    pub async fn activate(&self) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Activate).await
    }

    /// Answers a request issued by `client`.
    pub async fn fetch(
        &self,
        client: Option<ClientId>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DispatchError> {
        match self.dispatch(Event::Fetch { client, request }).await? {
            EventOutcome::Response(response) => Ok(response),
            other => {
                warn!(?other, "fetch handler produced no response");
                Err(DispatchError::NoResponse(EventKind::Fetch))
            }
        }
    }

    pub async fn message(
        &self,
        client: Option<ClientId>,
        data: Value,
    ) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Message { client, data }).await
    }

    pub async fn sync(&self, tag: impl Into<String>) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Sync { tag: tag.into() }).await
    }

    pub async fn push(&self, data: impl Into<Bytes>) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Push { data: data.into() }).await
    }

    pub async fn notification_click(
        &self,
        notification: Notification,
        action: Option<&str>,
    ) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::NotificationClick {
            notification,
            action: action.map(str::to_owned),
        })
        .await
    }

    pub async fn connectivity_changed(&self, online: bool) -> Result<EventOutcome, DispatchError> {
        self.dispatch(Event::Connectivity { online }).await
    }

    /// Queues a mutating request that failed offline, for replay on
    /// reconnect. Returns the queue id.
    pub async fn enqueue_offline(&self, request: &FetchRequest) -> Result<u64, DispatchError> {
        Ok(self
            .context
            .queue
            .enqueue(request.to_offline_action())
            .await?)
    }
}
