use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use bincode::{
    config::standard as bincode_config,
    serde::{decode_from_slice, encode_to_vec},
};
use bytes::Bytes;
use feoxdb::{FeoxError, FeoxStore};
use haven_backend::{ActionLog, BackendError, BackendResult, DeleteStatus, LogRecord};
use haven_core::Raw;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::FeOxDbError;

const META_KEY: &[u8] = b"queue:meta";

fn record_key(id: u64) -> Vec<u8> {
    format!("queue:record:{id:020}").into_bytes()
}

/// Bookkeeping stored next to the records.
///
/// `live` lists record ids in insertion order; `next_id` only grows.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogMeta {
    next_id: u64,
    live: Vec<u64>,
}

impl LogMeta {
    fn load(store: &FeoxStore) -> Result<Self, FeOxDbError> {
        match store.get(META_KEY) {
            Ok(encoded) => {
                let (meta, _) = decode_from_slice(&encoded, bincode_config())?;
                Ok(meta)
            }
            Err(FeoxError::KeyNotFound) => Ok(LogMeta::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, store: &FeoxStore) -> Result<(), FeOxDbError> {
        let encoded = encode_to_vec(self, bincode_config())?;
        store.insert(META_KEY, &encoded)?;
        Ok(())
    }
}

/// Disk-backed [`ActionLog`] using FeOxDB.
///
/// Every mutation is flushed before it returns. Mutations are serialized by
/// an async lock so concurrent appends never hand out the same id.
///
/// Cloning is cheap: clones share the same underlying database.
#[derive(Clone)]
pub struct FeOxDbActionLog {
    store: Arc<FeoxStore>,
    lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for FeOxDbActionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeOxDbActionLog").finish_non_exhaustive()
    }
}

impl FeOxDbActionLog {
    /// Starts building a new log.
    pub fn builder() -> FeOxDbActionLogBuilder {
        FeOxDbActionLogBuilder::default()
    }

    /// In-memory log for tests. Data is lost when dropped.
    ///
    /// ```
    /// use haven_feoxdb::FeOxDbActionLog;
    ///
    /// let log = FeOxDbActionLog::in_memory().expect("in-memory log");
    /// ```
    pub fn in_memory() -> Result<Self, FeOxDbError> {
        Self::builder().build()
    }

    /// Forces pending writes to disk. No-op in memory-only mode.
    pub fn flush(&self) {
        self.store.flush();
    }

    async fn blocking<T, F>(&self, op: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&FeoxStore) -> Result<T, FeOxDbError> + Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| BackendError::InternalError(Box::new(e)))?;
        Ok(result?)
    }
}

/// Builder for [`FeOxDbActionLog`].
#[derive(Debug, Default)]
pub struct FeOxDbActionLogBuilder {
    path: Option<PathBuf>,
    max_file_size: Option<u64>,
}

impl FeOxDbActionLogBuilder {
    /// Enables persistent storage at the given path.
    ///
    /// If path is a directory, creates `queue.db` inside it.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Pre-allocates disk space and caps maximum storage.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Opens or creates the log.
    pub fn build(self) -> Result<FeOxDbActionLog, FeOxDbError> {
        let mut builder = FeoxStore::builder();

        if let Some(mut path) = self.path {
            if path.is_dir() {
                path.push("queue.db");
            }
            builder = builder.device_path(path.to_string_lossy().to_string());
        }

        if let Some(file_size) = self.max_file_size {
            if file_size == 0 {
                return Err(FeOxDbError::InvalidConfig(
                    "max_file_size must be greater than zero".to_owned(),
                ));
            }
            builder = builder.file_size(file_size);
        }

        Ok(FeOxDbActionLog {
            store: Arc::new(builder.build()?),
            lock: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl ActionLog for FeOxDbActionLog {
    async fn append(&self, data: Raw) -> BackendResult<u64> {
        let _guard = self.lock.lock().await;
        let id = self
            .blocking(move |store| {
                let mut meta = LogMeta::load(store)?;
                let id = meta.next_id;
                store.insert(&record_key(id), &data)?;
                meta.next_id += 1;
                meta.live.push(id);
                meta.save(store)?;
                store.flush();
                Ok(id)
            })
            .await?;
        debug!(id, "appended log record");
        Ok(id)
    }

    async fn update(&self, id: u64, data: Raw) -> BackendResult<()> {
        let _guard = self.lock.lock().await;
        self.blocking(move |store| {
            let meta = LogMeta::load(store)?;
            if !meta.live.contains(&id) {
                return Err(FeOxDbError::UnknownRecord(id));
            }
            store.insert(&record_key(id), &data)?;
            store.flush();
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: u64) -> BackendResult<DeleteStatus> {
        let _guard = self.lock.lock().await;
        self.blocking(move |store| {
            let mut meta = LogMeta::load(store)?;
            let before = meta.live.len();
            meta.live.retain(|live| *live != id);
            if meta.live.len() == before {
                return Ok(DeleteStatus::Missing);
            }
            // metadata first: a crash before the record delete leaves an
            // orphan record, never a dangling id
            meta.save(store)?;
            match store.delete(&record_key(id)) {
                Ok(_) | Err(FeoxError::KeyNotFound) => {}
                Err(err) => return Err(err.into()),
            }
            store.flush();
            Ok(DeleteStatus::Deleted(1))
        })
        .await
    }

    async fn load(&self) -> BackendResult<Vec<LogRecord>> {
        let _guard = self.lock.lock().await;
        self.blocking(|store| {
            let meta = LogMeta::load(store)?;
            let mut records = Vec::with_capacity(meta.live.len());
            for id in meta.live {
                match store.get(&record_key(id)) {
                    Ok(data) => records.push(LogRecord {
                        id,
                        data: Bytes::from(data),
                    }),
                    Err(FeoxError::KeyNotFound) => continue,
                    Err(err) => return Err(err.into()),
                }
            }
            Ok(records)
        })
        .await
    }

    fn name(&self) -> &str {
        "feoxdb"
    }
}
