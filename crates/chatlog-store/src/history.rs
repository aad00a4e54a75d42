//! Host-facing conversation history
//!
//! Thin handle over a shared [`MessageRepository`] that speaks in plain ids:
//! a degraded store answers `save_message` with [`UNAVAILABLE_ID`] instead of
//! an `Option`, so hosts can keep a numeric id column.

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::repo::MessageRepository;
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};
use chatlog_core::model::{ChatMessage, EngineHealth, Role};
use std::sync::Arc;

/// Returned by `save_message` when the engine is unavailable
pub const UNAVAILABLE_ID: i64 = -1;

#[derive(Clone)]
pub struct ChatHistory {
    repo: Arc<MessageRepository>,
}

impl ChatHistory {
    pub fn new(repo: MessageRepository) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// History over a filesystem store when `snapshot_dir` is set, otherwise
    /// a process-local one
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the configuration does not validate.
    pub fn from_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let repo = if config.snapshot_dir.is_some() {
            MessageRepository::open(config)?
        } else {
            let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
            MessageRepository::with_store(config, store)
        };
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &MessageRepository {
        &self.repo
    }

    /// Initialize and report the outcome; never fails
    pub async fn init(&self) -> EngineHealth {
        if let Err(reason) = self.repo.init().await {
            tracing::warn!(
                snapshot_key = %self.repo.config().snapshot_key,
                err.code = reason.code(),
                "Chat history unavailable"
            );
        }
        self.repo.health()
    }

    /// Store one turn
    ///
    /// # Errors
    ///
    /// Write-path faults only; see [`MessageRepository::append`].
    pub async fn save_message(&self, role: Role, content: &str) -> Result<i64> {
        Ok(self
            .repo
            .append(role, content)
            .await?
            .unwrap_or(UNAVAILABLE_ID))
    }

    pub async fn get_history(&self) -> Vec<ChatMessage> {
        self.repo.list().await
    }

    /// # Errors
    ///
    /// Write-path faults only; see [`MessageRepository::clear`].
    pub async fn clear_history(&self) -> Result<()> {
        self.repo.clear().await
    }

    pub fn health(&self) -> EngineHealth {
        self.repo.health()
    }
}

impl From<MessageRepository> for ChatHistory {
    fn from(repo: MessageRepository) -> Self {
        Self::new(repo)
    }
}
