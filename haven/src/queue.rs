//! Offline action queue.
//!
//! Mutating requests that failed for lack of connectivity are captured as
//! [`OfflineAction`]s and appended to a durable [`ActionLog`]. A drain walks
//! the log in insertion order and replays one action at a time; an action is
//! removed only after its replay succeeded, so a crash mid-drain replays it
//! again rather than losing it.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use haven_backend::{ActionLog, ValueFormat};
use haven_core::Upstream;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::WorkerError;
use crate::metrics;

/// A mutating request performed while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineAction {
    /// Absolute target URL.
    pub url: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Request headers in original order.
    pub headers: Vec<(String, Vec<u8>)>,
    /// Request body.
    pub body: Bytes,
    /// When the action was captured.
    pub created_at: DateTime<Utc>,
}

impl OfflineAction {
    /// Captures an action without headers or body.
    pub fn new(method: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.as_ref().to_ascii_uppercase(),
            headers: Vec::new(),
            body: Bytes::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Replay bookkeeping stored with each action.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAction {
    action: OfflineAction,
    attempts: u32,
    last_attempt_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// An action waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAction {
    /// Queue id, increasing in insertion order.
    pub id: u64,
    /// The captured request.
    pub action: OfflineAction,
    /// Failed replay attempts so far.
    pub attempts: u32,
    /// When the last replay was attempted.
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Why the last replay failed.
    pub last_error: Option<String>,
}

impl QueuedAction {
    fn from_stored(id: u64, stored: StoredAction) -> Self {
        Self {
            id,
            action: stored.action,
            attempts: stored.attempts,
            last_attempt_at: stored.last_attempt_at,
            last_error: stored.last_error,
        }
    }

    fn to_stored(&self) -> StoredAction {
        StoredAction {
            action: self.action.clone(),
            attempts: self.attempts,
            last_attempt_at: self.last_attempt_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Retry policy for failed replays.
///
/// The n-th retry waits `base_delay * 2^(n-1)`, capped at `max_delay`. An
/// action that failed `max_attempts` times is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Replay attempts before an action is abandoned.
    pub max_attempts: u32,
    /// Delay after the first failure (e.g. "30s").
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Upper bound for the delay (e.g. "1h").
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(60 * 60),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately on every drain, up to `max_attempts`.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay required after `attempts` failures.
    pub fn delay_after(&self, attempts: u32) -> Duration {
        if attempts == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempts - 1).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether an action with `attempts` failures should be dropped.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    fn ready(&self, queued: &QueuedAction, now: DateTime<Utc>) -> bool {
        let Some(last) = queued.last_attempt_at else {
            return true;
        };
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        elapsed >= self.delay_after(queued.attempts)
    }
}

/// Outcome of one drain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Actions replayed and removed, in replay order.
    pub replayed: Vec<QueuedAction>,
    /// The action whose replay failed and stays queued.
    pub failed: Option<QueuedAction>,
    /// Actions dropped after exhausting their retries.
    pub abandoned: Vec<QueuedAction>,
    /// The drain stopped at an action still backing off.
    pub deferred: bool,
    /// Actions left in the queue.
    pub remaining: usize,
}

impl DrainReport {
    /// Whether the queue was emptied.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Durable FIFO queue of offline actions.
pub struct OfflineQueue {
    log: Arc<dyn ActionLog>,
    retry: RetryPolicy,
    format: ValueFormat,
    drain: Mutex<()>,
}

impl std::fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue")
            .field("log", &self.log.name())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OfflineQueue {
    /// Creates a queue over `log`.
    pub fn new(log: Arc<dyn ActionLog>, retry: RetryPolicy) -> Self {
        Self {
            log,
            retry,
            format: ValueFormat::Bincode,
            drain: Mutex::new(()),
        }
    }

    /// Replay policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Appends an action and returns its queue id.
    pub async fn enqueue(&self, action: OfflineAction) -> Result<u64, WorkerError> {
        let stored = StoredAction {
            action,
            attempts: 0,
            last_attempt_at: None,
            last_error: None,
        };
        let raw = self.format.encode(&stored)?;
        let id = self.log.append(raw).await?;
        info!(
            id,
            method = %stored.action.method,
            url = %stored.action.url,
            "queued offline action"
        );
        metrics::record_queue(1, 0, 0, 0);
        Ok(id)
    }

    /// Every queued action in FIFO order.
    ///
    /// Records that cannot be decoded are skipped.
    pub async fn pending(&self) -> Result<Vec<QueuedAction>, WorkerError> {
        let records = self.log.load().await?;
        let mut actions = Vec::with_capacity(records.len());
        for record in records {
            match self.format.decode::<StoredAction>(&record.data) {
                Ok(stored) => actions.push(QueuedAction::from_stored(record.id, stored)),
                Err(error) => warn!(id = record.id, %error, "skipping undecodable action"),
            }
        }
        Ok(actions)
    }

    /// Number of queued actions.
    pub async fn len(&self) -> Result<usize, WorkerError> {
        Ok(self.pending().await?.len())
    }

    /// Whether the queue is empty.
    pub async fn is_empty(&self) -> Result<bool, WorkerError> {
        Ok(self.len().await? == 0)
    }

    /// Replays queued actions through `upstream`, oldest first.
    ///
    /// One action is in flight at a time and concurrent drains run one after
    /// the other. A successful replay removes the action. The drain stops at
    /// the first failing action, which keeps its place with one more attempt
    /// recorded, or at the first action still backing off. An action that
    /// exhausts the retry policy is removed, reported as abandoned, and the
    /// drain moves on to the next one.
    pub async fn drain<U, E>(&self, upstream: &mut U) -> Result<DrainReport, WorkerError>
    where
        U: Upstream<OfflineAction, Response = Result<(), E>>,
        E: Display,
    {
        let _guard = self.drain.lock().await;
        let pending = self.pending().await?;
        let span = info_span!("haven.drain", pending = pending.len());
        async move {
            let total = pending.len();
            let mut report = DrainReport::default();

            for mut queued in pending {
                if !self.retry.ready(&queued, Utc::now()) {
                    debug!(id = queued.id, attempts = queued.attempts, "action still backing off");
                    report.deferred = true;
                    break;
                }

                let outcome = upstream.call(queued.action.clone()).await;
                match outcome {
                    Ok(()) => {
                        self.log.remove(queued.id).await?;
                        info!(id = queued.id, url = %queued.action.url, "replayed offline action");
                        report.replayed.push(queued);
                    }
                    Err(error) => {
                        queued.attempts += 1;
                        queued.last_attempt_at = Some(Utc::now());
                        queued.last_error = Some(error.to_string());

                        if self.retry.is_exhausted(queued.attempts) {
                            self.log.remove(queued.id).await?;
                            warn!(
                                id = queued.id,
                                attempts = queued.attempts,
                                %error,
                                "abandoning offline action"
                            );
                            report.abandoned.push(queued);
                            continue;
                        }

                        let raw = self.format.encode(&queued.to_stored())?;
                        self.log.update(queued.id, raw).await?;
                        warn!(
                            id = queued.id,
                            attempts = queued.attempts,
                            %error,
                            "replay failed, action kept"
                        );
                        report.failed = Some(queued);
                        break;
                    }
                }
            }

            report.remaining = total - report.replayed.len() - report.abandoned.len();
            metrics::record_queue(
                0,
                report.replayed.len() as u64,
                u64::from(report.failed.is_some() || !report.abandoned.is_empty()),
                report.abandoned.len() as u64,
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }
}
