use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use haven::{Notification, Notifier, WorkerError};
use tokio::sync::broadcast;
use tracing::info;

/// In-process [`Notifier`].
///
/// Keeps the notifications currently displayed and broadcasts each one to
/// subscribers, which is where a platform binding picks them up.
#[derive(Debug)]
pub struct NotificationCenter {
    shown: Mutex<Vec<Notification>>,
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            shown: Mutex::new(Vec::new()),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Notifications on display, oldest first.
    pub fn shown(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes a notification from display.
    pub fn dismiss(&self, notification: &Notification) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|shown| shown != notification);
    }
}

#[async_trait]
impl Notifier for NotificationCenter {
    async fn show(&self, notification: Notification) -> Result<(), WorkerError> {
        info!(title = %notification.title, tag = ?notification.tag, "showing notification");
        {
            let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
            // a tag replaces the notification already showing it
            if let Some(tag) = &notification.tag {
                shown.retain(|n| n.tag.as_ref() != Some(tag));
            }
            shown.push(notification.clone());
        }
        // no subscribers is fine
        let _ = self.sender.send(notification);
        Ok(())
    }
}
