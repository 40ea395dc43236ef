use std::sync::Arc;

use bytesize::ByteSize;
use haven_backend::ActionLog;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default location of the durable queue, relative to the working directory.
pub const DEFAULT_QUEUE_PATH: &str = "haven-queue.db";

/// Where the offline action queue is kept.
///
/// The queue is durable unless `InMemory` is asked for explicitly.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Queue {
    /// Durable log on disk.
    FeOxDb(FeOxDb),
    /// Lost on restart; for tests and previews.
    InMemory,
}

impl Default for Queue {
    fn default() -> Self {
        Queue::FeOxDb(FeOxDb::default())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeOxDb {
    /// File or directory; a directory gets `queue.db` inside it.
    #[serde(default = "FeOxDb::default_path")]
    pub path: String,
    #[serde(default)]
    pub max_file_size: Option<ByteSize>,
}

impl FeOxDb {
    fn default_path() -> String {
        DEFAULT_QUEUE_PATH.to_owned()
    }
}

impl Default for FeOxDb {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_file_size: None,
        }
    }
}

impl Queue {
    pub fn into_log(self) -> Result<Arc<dyn ActionLog>, ConfigError> {
        match self {
            #[cfg(feature = "feoxdb")]
            Queue::FeOxDb(config) => {
                use haven_feoxdb::FeOxDbActionLog;

                let mut builder = FeOxDbActionLog::builder().path(&config.path);
                if let Some(size) = config.max_file_size {
                    builder = builder.max_file_size(size.as_u64());
                }
                let log = builder
                    .build()
                    .map_err(|e| ConfigError::BackendNotAvailable(format!("FeOxDb: {e}")))?;
                Ok(Arc::new(log))
            }
            #[cfg(feature = "feoxdb")]
            Queue::InMemory => {
                let log = haven_feoxdb::FeOxDbActionLog::in_memory()
                    .map_err(|e| ConfigError::BackendNotAvailable(format!("FeOxDb: {e}")))?;
                Ok(Arc::new(log))
            }
            #[cfg(not(feature = "feoxdb"))]
            Queue::FeOxDb(_) | Queue::InMemory => {
                Err(ConfigError::BackendNotAvailable("FeOxDb".to_owned()))
            }
        }
    }
}
