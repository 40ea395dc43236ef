//! The standard event handlers.

use std::sync::Arc;

use haven::{ClientMessage, Notification, PushPayload, WorkerMessage, WorkerState};
use haven::notification::CLOSE_ACTION;
use haven_core::Upstream;
use haven_http::{FetchError, FetchRequest, Network, ReplayUpstream, fetch_shell};
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::event::{Event, EventOutcome};
use crate::worker::WorkerContext;

type HandlerResult = Result<EventOutcome, DispatchError>;

fn claim_clients<N>(ctx: &WorkerContext<N>) {
    let version = ctx.lifecycle.registration().active();
    if let Some(version) = version {
        let claimed = ctx.clients.claim(&version);
        debug!(%version, claimed, "claimed open clients");
    }
}

pub(crate) async fn install<N>(ctx: Arc<WorkerContext<N>>, _event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    let mut network = ctx.network();
    let urls = ctx.config.shell_urls();
    let state = ctx
        .lifecycle
        .install(fetch_shell(ctx.lifecycle.version(), &urls, &mut network))
        .await?;
    if state == WorkerState::Active {
        claim_clients(&ctx);
    }
    Ok(EventOutcome::Installed(state))
}

pub(crate) async fn activate<N>(ctx: Arc<WorkerContext<N>>, _event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    ctx.lifecycle.activate().await?;
    claim_clients(&ctx);
    Ok(EventOutcome::Activated)
}

pub(crate) async fn fetch<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    let Event::Fetch { client, request } = event else {
        return Ok(EventOutcome::Ignored);
    };
    let token = match client {
        Some(id) => Some(ctx.clients.token(id).ok_or(DispatchError::UnknownClient(id))?),
        None => None,
    };

    let mut network = ctx.network();
    let fetch = ctx.handler.fetch(request, &mut network);
    let response = match token {
        Some(mut token) => {
            tokio::select! {
                response = fetch => response,
                _ = token.cancelled() => {
                    debug!("client closed, fetch cancelled");
                    Err(FetchError::Cancelled)
                }
            }
        }
        None => fetch.await,
    };
    Ok(EventOutcome::Response(response?))
}

pub(crate) async fn message<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    let Event::Message { client, data } = event else {
        return Ok(EventOutcome::Ignored);
    };
    match serde_json::from_value::<ClientMessage>(data) {
        Ok(ClientMessage::SkipWaiting) => {
            info!(client = ?client, "skip waiting requested");
            let activated = ctx.lifecycle.skip_waiting().await?;
            if activated {
                claim_clients(&ctx);
            }
            Ok(EventOutcome::SkippedWaiting(activated))
        }
        Err(error) => {
            debug!(client = ?client, %error, "ignoring unrecognized message");
            Ok(EventOutcome::Ignored)
        }
    }
}

pub(crate) async fn sync<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    let Event::Sync { tag } = event else {
        return Ok(EventOutcome::Ignored);
    };
    if tag != ctx.config.sync_tag {
        debug!(%tag, "ignoring unknown sync tag");
        return Ok(EventOutcome::Ignored);
    }
    drain(&ctx).await
}

pub(crate) async fn connectivity<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    let Event::Connectivity { online } = event else {
        return Ok(EventOutcome::Ignored);
    };
    if !online {
        info!("connectivity lost");
        return Ok(EventOutcome::Ignored);
    }
    info!("connectivity restored, draining offline actions");
    drain(&ctx).await
}

/// Replays the offline queue, then confirms every replayed action to the
/// user and to open pages.
async fn drain<N>(ctx: &WorkerContext<N>) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
    <N as Upstream<FetchRequest>>::Future: 'static,
{
    let mut upstream = ReplayUpstream::new(ctx.network());
    let report = ctx.queue.drain(&mut upstream).await?;

    for queued in &report.replayed {
        let notification = Notification::action_synced(
            queued.id,
            &queued.action,
            &ctx.config.notification,
            &ctx.config.messages,
        );
        if let Err(error) = ctx.notifier.show(notification).await {
            warn!(id = queued.id, %error, "replay confirmation not shown");
        }
        ctx.lifecycle
            .registration()
            .post(WorkerMessage::ActionReplayed {
                id: queued.id,
                url: queued.action.url.clone(),
            });
    }
    Ok(EventOutcome::Drained(report))
}

pub(crate) async fn push<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    let Event::Push { data } = event else {
        return Ok(EventOutcome::Ignored);
    };
    let payload = PushPayload::parse(&data)?;
    let notification =
        Notification::from_push(payload, &ctx.config.notification, &ctx.config.messages);
    ctx.notifier.show(notification.clone()).await?;
    Ok(EventOutcome::Notified(notification))
}

pub(crate) async fn notification_click<N>(ctx: Arc<WorkerContext<N>>, event: Event) -> HandlerResult
where
    N: Network + Clone + Sync + 'static,
{
    let Event::NotificationClick {
        notification,
        action,
    } = event
    else {
        return Ok(EventOutcome::Ignored);
    };
    if action.as_deref() == Some(CLOSE_ACTION) {
        debug!("notification dismissed");
        return Ok(EventOutcome::Ignored);
    }

    let url = ctx.resolve(notification.url().unwrap_or("/"));
    let clients = ctx.clients.all();
    let target = clients
        .iter()
        .find(|client| client.url == url)
        .or_else(|| clients.first());
    if let Some(client) = target
        && ctx.clients.focus(client.id, Some(&url)).is_some()
    {
        debug!(client = %client.id, %url, "focused open client");
        return Ok(EventOutcome::Focused(client.id));
    }

    let id = ctx
        .clients
        .open_window(&url, ctx.lifecycle.registration().active());
    debug!(client = %id, %url, "opened window");
    Ok(EventOutcome::Opened(id))
}
