//! Error handling for chatlog-store
//!
//! Wraps chatlog-core ExError with store-specific constructors, one per
//! failure class the store distinguishes.

use chatlog_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// A statement against the engine failed
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StatementExecution)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// The engine runtime could not be produced
pub fn engine_unavailable(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::EngineUnavailable)
        .with_op("load_engine")
        .with_message(reason)
}

/// Snapshot bytes did not yield a usable engine image
pub fn corrupt_snapshot(key: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::CorruptSnapshot)
        .with_op("restore_snapshot")
        .with_key(key)
        .with_message(reason)
}

/// Writing a snapshot to the store failed
pub fn persistence_write(key: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::PersistenceWrite)
        .with_op("persist_snapshot")
        .with_key(key)
        .with_message(reason)
}

/// Reading a snapshot from the store failed (distinct from "absent")
pub fn persistence_read(key: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::PersistenceRead)
        .with_op("read_snapshot")
        .with_key(key)
        .with_message(reason)
}

/// A schema migration failed
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Migration)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// A lock guarding shared state was poisoned
pub fn poisoned(what: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("lock")
        .with_message(format!("{} lock poisoned", what))
}
