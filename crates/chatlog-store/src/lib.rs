//! Chatlog Store - conversation history on a snapshotted in-memory SQLite
//!
//! Provides:
//! - Engine loading and exactly-once bootstrap with degraded mode
//! - Snapshot stores (filesystem, in-memory) and the engine image codec
//! - Schema migrations with a checksummed ledger
//! - Message repository (append/list/clear) and the host-facing `ChatHistory`
//!
//! Every mutation rewrites the whole database image under one key; there is
//! no database file.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod history;
pub mod migrations;
pub mod repo;
pub mod snapshot;

// Re-export key types
pub use config::{PersistCadence, StoreConfig, DEFAULT_SNAPSHOT_KEY};
pub use engine::{EngineLoader, SqliteRuntimeLoader};
pub use errors::Result;
pub use history::{ChatHistory, UNAVAILABLE_ID};
pub use repo::MessageRepository;
pub use snapshot::{FsSnapshotStore, MemorySnapshotStore, SnapshotStore};
