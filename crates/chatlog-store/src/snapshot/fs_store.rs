//! Filesystem-backed snapshot store
//!
//! One file per key under a root directory; see `sharding` for the layout.

use crate::errors::{persistence_read, persistence_write, Result};
use crate::snapshot::atomic::atomic_write;
use crate::snapshot::sharding::shard_path;
use crate::snapshot::store::SnapshotStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem `SnapshotStore`
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the blob for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        shard_path(&self.root, key)
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(persistence_read(key, e.to_string())),
        }
    }

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        atomic_write(&self.path_for(key), &bytes)
            .await
            .map_err(|e| persistence_write(key, "atomic write failed").with_source(e))?;

        tracing::trace!(
            snapshot_key = key,
            snapshot_bytes = bytes.len(),
            "Wrote snapshot file"
        );
        Ok(())
    }
}
