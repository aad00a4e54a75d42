use async_trait::async_trait;
use chatlog_store::errors::{persistence_read, persistence_write, Result};
use chatlog_store::{
    EngineLoader, MemorySnapshotStore, MessageRepository, SnapshotStore, SqliteRuntimeLoader,
    StoreConfig,
};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Repository over a shared in-memory store with a unique key
#[allow(dead_code)]
pub fn memory_repo(store: &MemorySnapshotStore, key: &str) -> MessageRepository {
    MessageRepository::with_store(
        StoreConfig::default().with_snapshot_key(key),
        Arc::new(store.clone()),
    )
}

/// Memory store whose writes can be switched to fail
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemorySnapshotStore,
    reject_writes: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new(inner: MemorySnapshotStore) -> Self {
        Self {
            inner,
            reject_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(persistence_write(key, "quota exceeded"));
        }
        self.inner.set(key, bytes).await
    }
}

/// Store whose reads always fail
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct UnreadableStore {
    pub inner: MemorySnapshotStore,
}

#[async_trait]
impl SnapshotStore for UnreadableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Err(persistence_read(key, "backend offline"))
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.inner.set(key, bytes).await
    }
}

/// Loader that counts calls and yields before producing an engine
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct CountingLoader {
    loads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingLoader {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLoader for CountingLoader {
    async fn load(&self) -> Result<Connection> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        SqliteRuntimeLoader::default().load().await
    }
}
