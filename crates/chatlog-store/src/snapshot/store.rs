//! Snapshot store abstraction
//!
//! A durable key → bytes map. The store never interprets the blob; it only
//! has to hand back exactly what was last written under a key.

use crate::errors::Result;
use async_trait::async_trait;

/// Durable key-value persistence for engine images
///
/// `get` distinguishes "never written" (`Ok(None)`) from a failed read
/// (`Err`, kind `PersistenceRead`). `set` replaces the whole blob; a failed
/// `set` returns kind `PersistenceWrite` and must leave the previous blob
/// readable.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}
