//! Snapshot persistence layer.
//!
//! ## Responsibilities
//!
//! - The `SnapshotStore` abstraction and its filesystem / in-memory backends
//! - Encoding a live engine to bytes and rebuilding an engine from bytes
//! - Writing a full image of the engine under the configured key
//!
//! ## Non-Responsibilities
//!
//! - Deciding when to persist (handled by the repository's cadence)
//! - Recovery policy for unusable images (handled by `bootstrap`)

mod atomic;
pub mod fs_store;
pub mod image;
pub mod memory_store;
mod sharding;
pub mod store;

pub use fs_store::FsSnapshotStore;
pub use image::{export_image, import_image, restore_image};
pub use memory_store::MemorySnapshotStore;
pub use store::SnapshotStore;

use crate::errors::Result;
use rusqlite::Connection;
use std::time::Instant;

/// Serialize `conn` and write the image under `key`
///
/// Returns the image size in bytes.
///
/// ## Errors
///
/// - `ExErrorKind::StatementExecution`: the engine could not be serialized
/// - `ExErrorKind::PersistenceWrite`: the store rejected the write
pub async fn persist_snapshot(
    conn: &mut Connection,
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<usize> {
    let start = Instant::now();
    let image = export_image(conn)?;
    let size = image.len();

    store.set(key, image).await?;

    tracing::debug!(
        snapshot_key = key,
        snapshot_bytes = size,
        duration_ms = start.elapsed().as_millis() as u64,
        "Persisted snapshot"
    );

    Ok(size)
}
