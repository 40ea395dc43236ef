use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WorkerError;
use crate::config::Messages;
use crate::queue::OfflineAction;

/// Action id that opens the notification's target URL.
pub const OPEN_ACTION: &str = "open";
/// Action id that just dismisses the notification.
pub const CLOSE_ACTION: &str = "close";

/// Text direction of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Let the platform decide.
    #[default]
    Auto,
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

/// Presentation shared by every notification the worker shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    /// Icon URL.
    pub icon: String,
    /// Monochrome badge URL.
    pub badge: String,
    /// Text direction.
    pub dir: TextDirection,
    /// Language tag.
    pub lang: String,
    /// Keep the notification until the user acts on it.
    pub require_interaction: bool,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            icon: "/icons/icon-192x192.png".to_owned(),
            badge: "/icons/icon-72x72.png".to_owned(),
            dir: TextDirection::Rtl,
            lang: "he".to_owned(),
            require_interaction: true,
            vibrate: vec![200, 100, 200],
        }
    }
}

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Action id reported back on click.
    pub action: String,
    /// Button label.
    pub title: String,
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Monochrome badge URL.
    pub badge: String,
    /// A later notification with the same tag replaces this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Text direction.
    pub dir: TextDirection,
    /// Language tag.
    pub lang: String,
    /// Keep the notification until the user acts on it.
    pub require_interaction: bool,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Buttons, `open` then `close`.
    pub actions: Vec<NotificationAction>,
    /// Opaque data; `data.url` is where a click navigates.
    pub data: Value,
}

impl Notification {
    fn styled(
        title: String,
        body: String,
        tag: Option<String>,
        data: Value,
        defaults: &NotificationDefaults,
        messages: &Messages,
    ) -> Self {
        Self {
            title,
            body,
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            tag,
            dir: defaults.dir,
            lang: defaults.lang.clone(),
            require_interaction: defaults.require_interaction,
            vibrate: defaults.vibrate.clone(),
            actions: vec![
                NotificationAction {
                    action: OPEN_ACTION.to_owned(),
                    title: messages.open_action.clone(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_owned(),
                    title: messages.close_action.clone(),
                },
            ],
            data,
        }
    }

    /// Renders a push payload, filling gaps with the localized defaults.
    pub fn from_push(
        payload: PushPayload,
        defaults: &NotificationDefaults,
        messages: &Messages,
    ) -> Self {
        Self::styled(
            payload.title.unwrap_or_else(|| messages.push_title.clone()),
            payload.body.unwrap_or_else(|| messages.push_body.clone()),
            payload.tag,
            payload.data.unwrap_or(Value::Null),
            defaults,
            messages,
        )
    }

    /// Confirms that a queued offline action reached the backend.
    pub fn action_synced(
        id: u64,
        action: &OfflineAction,
        defaults: &NotificationDefaults,
        messages: &Messages,
    ) -> Self {
        Self::styled(
            messages.action_synced_title.clone(),
            messages.action_synced_body.clone(),
            Some(format!("offline-action-{id}")),
            serde_json::json!({ "url": action.url, "method": action.method }),
            defaults,
            messages,
        )
    }

    /// Where a click on this notification should navigate.
    pub fn url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }
}

/// Decoded push message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Headline; the localized push title when missing.
    pub title: Option<String>,
    /// Body text; the localized push body when missing.
    pub body: Option<String>,
    /// Replacement tag.
    pub tag: Option<String>,
    /// Opaque data carried to the click handler.
    pub data: Option<Value>,
}

impl PushPayload {
    /// Decodes a push message body.
    ///
    /// JSON objects map field by field; any other text becomes the body and
    /// an empty message yields the defaults.
    pub fn parse(raw: &[u8]) -> Result<Self, WorkerError> {
        let text = std::str::from_utf8(raw).map_err(|_| WorkerError::InvalidPayload)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<PushPayload>(text) {
            Ok(payload) => Ok(payload),
            Err(_) => Ok(Self {
                body: Some(text.to_owned()),
                ..Self::default()
            }),
        }
    }
}

/// Shows notifications to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Displays a notification.
    async fn show(&self, notification: Notification) -> Result<(), WorkerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_json_fills_missing_fields_with_defaults() {
        let payload =
            PushPayload::parse(br#"{"title":"Task assigned","data":{"url":"/tasks/7"}}"#).unwrap();
        let messages = Messages::default();
        let n = Notification::from_push(payload, &NotificationDefaults::default(), &messages);

        assert_eq!(n.title, "Task assigned");
        assert_eq!(n.body, messages.push_body);
        assert_eq!(n.url(), Some("/tasks/7"));
        assert_eq!(n.dir, TextDirection::Rtl);
        assert_eq!(n.lang, "he");
        assert!(n.require_interaction);
        let actions: Vec<_> = n.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec![OPEN_ACTION, CLOSE_ACTION]);
    }

    #[test]
    fn plain_text_push_becomes_body() {
        let payload = PushPayload::parse(b"  hello  ").unwrap();
        assert_eq!(payload.body.as_deref(), Some("hello"));
        assert!(payload.title.is_none());
    }

    #[test]
    fn empty_push_uses_defaults() {
        assert_eq!(PushPayload::parse(b"").unwrap(), PushPayload::default());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            PushPayload::parse(&[0xff, 0xfe]),
            Err(WorkerError::InvalidPayload)
        ));
    }

    #[test]
    fn serializes_with_platform_field_names() {
        let n = Notification::from_push(
            PushPayload::default(),
            &NotificationDefaults::default(),
            &Messages::default(),
        );
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["requireInteraction"], true);
        assert_eq!(json["dir"], "rtl");
        assert!(json.get("tag").is_none());
    }
}
