use serde::{Deserialize, Serialize};

use crate::notification::NotificationDefaults;
use crate::queue::RetryPolicy;

/// Root-relative paths fetched into the static partition at install time.
pub const DEFAULT_SHELL: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// Path prefixes whose responses are handled by the API strategy.
pub const DEFAULT_API_PREFIXES: &[&str] = &[
    "/api/projects",
    "/api/tasks",
    "/api/apartments",
    "/api/buildings",
    "/api/floors",
];

/// Background sync tag that drains the offline queue.
pub const DEFAULT_SYNC_TAG: &str = "sync-offline-actions";

/// Everything a worker version needs to know about the app it serves.
///
/// Every field has a default, so a configuration file only lists what it
/// changes.
///
/// ```
/// use haven::WorkerConfig;
///
/// let config = WorkerConfig {
///     version: "v7".into(),
///     ..WorkerConfig::default()
/// };
/// assert_eq!(config.partitions().static_name(), "haven-static-v7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Version tag. Changing it produces a new set of partition names.
    pub version: String,
    /// Prefix shared by every partition name.
    pub cache_prefix: String,
    /// Origin the app is served from, e.g. `https://app.example`.
    pub origin: String,
    /// App shell, fetched verbatim at install time.
    pub shell: Vec<String>,
    /// Same-origin path prefixes routed to the API strategy.
    pub api_prefixes: Vec<String>,
    /// External backend hosts; any URL on them is an API request.
    pub backend_hosts: Vec<String>,
    /// Background sync tag that drains the offline queue.
    pub sync_tag: String,
    /// User-visible texts.
    pub messages: Messages,
    /// Presentation shared by every notification.
    pub notification: NotificationDefaults,
    /// Replay policy for the offline queue.
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_owned(),
            cache_prefix: "haven".to_owned(),
            origin: "http://localhost".to_owned(),
            shell: DEFAULT_SHELL.iter().map(|p| (*p).to_owned()).collect(),
            api_prefixes: DEFAULT_API_PREFIXES.iter().map(|p| (*p).to_owned()).collect(),
            backend_hosts: Vec::new(),
            sync_tag: DEFAULT_SYNC_TAG.to_owned(),
            messages: Messages::default(),
            notification: NotificationDefaults::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl WorkerConfig {
    /// Partition names for this version.
    pub fn partitions(&self) -> PartitionNames {
        PartitionNames::new(&self.cache_prefix, &self.version)
    }

    /// Absolute URLs of the app shell.
    pub fn shell_urls(&self) -> Vec<String> {
        let origin = self.origin.trim_end_matches('/');
        self.shell
            .iter()
            .map(|path| {
                if path.starts_with('/') {
                    format!("{origin}{path}")
                } else {
                    format!("{origin}/{path}")
                }
            })
            .collect()
    }
}

/// The pair of partitions owned by one worker version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionNames {
    static_name: String,
    dynamic_name: String,
}

impl PartitionNames {
    /// Derives `{prefix}-static-{version}` and `{prefix}-dynamic-{version}`.
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            static_name: format!("{prefix}-static-{version}"),
            dynamic_name: format!("{prefix}-dynamic-{version}"),
        }
    }

    /// Partition holding the app shell and cache-first assets.
    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    /// Partition holding runtime page and API responses.
    pub fn dynamic_name(&self) -> &str {
        &self.dynamic_name
    }

    /// Both names, static first.
    pub fn current(&self) -> [&str; 2] {
        [&self.static_name, &self.dynamic_name]
    }

    /// Whether `name` belongs to this version.
    pub fn contains(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}

/// User-visible texts, Hebrew by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Body of the synthesized offline page.
    pub page_offline: String,
    /// `error` field of the synthesized offline API response.
    pub api_offline: String,
    /// Title of a push notification that carried none.
    pub push_title: String,
    /// Body of a push notification that carried none.
    pub push_body: String,
    /// Label of the `open` notification action.
    pub open_action: String,
    /// Label of the `close` notification action.
    pub close_action: String,
    /// Title of the notification shown after an offline action was replayed.
    pub action_synced_title: String,
    /// Body of the notification shown after an offline action was replayed.
    pub action_synced_body: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            page_offline: "אין חיבור לאינטרנט. הדף יהיה זמין כשהחיבור יחזור.".to_owned(),
            api_offline: "אין חיבור לאינטרנט".to_owned(),
            push_title: "עדכון חדש".to_owned(),
            push_body: "יש לך עדכון חדש במערכת".to_owned(),
            open_action: "פתח".to_owned(),
            close_action: "סגור".to_owned(),
            action_synced_title: "הפעולה סונכרנה".to_owned(),
            action_synced_body: "פעולה שבוצעה במצב לא מקוון נשלחה בהצלחה".to_owned(),
        }
    }
}
