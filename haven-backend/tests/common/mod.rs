//! Simple in-memory test backend implementation using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use haven_backend::{Backend, BackendError, BackendResult, DeleteStatus, ValueFormat};
use haven_core::{CachedEntry, Raw, RequestKey};
use std::sync::Arc;

/// Simple in-memory partition for testing.
#[derive(Clone)]
pub struct TestBackend {
    store: Arc<DashMap<RequestKey, CachedEntry<Raw>>>,
    format: ValueFormat,
}

impl TestBackend {
    pub fn new(format: ValueFormat) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            format,
        }
    }

    pub fn get_raw(&self, key: &RequestKey) -> Option<CachedEntry<Raw>> {
        self.store.get(key).map(|v| v.clone())
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<CachedEntry<Raw>>> {
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &RequestKey, value: CachedEntry<Raw>) -> BackendResult<()> {
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &RequestKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self.store.iter().map(|e| e.key().clone()).collect())
    }

    fn name(&self) -> &str {
        "test"
    }

    fn value_format(&self) -> ValueFormat {
        self.format
    }
}

/// Backend that fails every operation.
pub struct ErrorBackend;

fn simulated() -> BackendError {
    BackendError::InternalError(Box::new(std::io::Error::other("simulated error")))
}

#[async_trait]
impl Backend for ErrorBackend {
    async fn read(&self, _key: &RequestKey) -> BackendResult<Option<CachedEntry<Raw>>> {
        Err(simulated())
    }

    async fn write(&self, _key: &RequestKey, _value: CachedEntry<Raw>) -> BackendResult<()> {
        Err(BackendError::QuotaExceeded("partition full".into()))
    }

    async fn remove(&self, _key: &RequestKey) -> BackendResult<DeleteStatus> {
        Err(simulated())
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Err(simulated())
    }
}
