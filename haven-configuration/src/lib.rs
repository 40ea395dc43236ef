#![doc = include_str!("../README.md")]

mod error;
pub mod queue;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use haven::WorkerConfig;
use haven_backend::{ActionLog, Storage as StorageTrait};
use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use queue::Queue;
pub use storage::Storage;

/// A worker configuration file.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigWorker {
    pub worker: WorkerConfig,
    pub storage: Storage,
    pub queue: Queue,
}

/// Everything needed to start a worker.
pub struct WorkerParts {
    pub config: WorkerConfig,
    pub storage: Arc<dyn StorageTrait>,
    pub log: Arc<dyn ActionLog>,
}

impl std::fmt::Debug for WorkerParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerParts")
            .field("config", &self.config)
            .field("log", &self.log.name())
            .finish_non_exhaustive()
    }
}

impl ConfigWorker {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let worker = &self.worker;
        if worker.version.is_empty() {
            return Err(ConfigError::Invalid {
                field: "worker.version",
                reason: "must not be empty".to_owned(),
            });
        }
        if !worker.origin.starts_with("http://") && !worker.origin.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "worker.origin",
                reason: format!("{} is not an http(s) origin", worker.origin),
            });
        }
        if worker.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "worker.retry.max_attempts",
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }

    /// Validates the configuration and opens its storage and queue.
    pub fn into_parts(self) -> Result<WorkerParts, ConfigError> {
        self.validate()?;
        Ok(WorkerParts {
            storage: self.storage.into_storage()?,
            log: self.queue.into_log()?,
            config: self.worker,
        })
    }
}
