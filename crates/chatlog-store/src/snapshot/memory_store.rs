//! Process-local snapshot store
//!
//! For hosts without durable storage and for tests. Clones share state, so a
//! "restart" is simulated by building a new repository over a clone.

use crate::errors::{poisoned, Result};
use crate::snapshot::store::SnapshotStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, Vec<u8>>,
    writes: usize,
}

/// In-memory `SnapshotStore`
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob without counting it as a write
    pub fn with_blob(self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.blobs.insert(key.into(), bytes);
        }
        self
    }

    /// Number of successful `set` calls so far
    pub fn writes(&self) -> usize {
        self.inner.lock().map(|i| i.writes).unwrap_or(0)
    }

    /// Current blob under `key`, bypassing the async interface
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.blobs.get(key).cloned())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().map_err(|_| poisoned("snapshot store"))?;
        Ok(inner.blobs.get(key).cloned())
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| poisoned("snapshot store"))?;
        inner.blobs.insert(key.to_string(), bytes);
        inner.writes += 1;
        Ok(())
    }
}
