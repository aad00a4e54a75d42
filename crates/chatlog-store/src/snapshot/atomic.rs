//! Atomic write primitive
//!
//! temp → fsync → rename, so readers see either the old blob or the new one.

use crate::errors::{io_error, Result};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Atomically replace `target_path` with `content`
pub async fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create_snapshot_dir", e))?;
    }

    let temp_path = target_path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| io_error("create_snapshot_temp", e))?;
    file.write_all(content)
        .await
        .map_err(|e| io_error("write_snapshot_temp", e))?;
    file.sync_all()
        .await
        .map_err(|e| io_error("sync_snapshot_temp", e))?;
    drop(file);

    fs::rename(&temp_path, target_path)
        .await
        .map_err(|e| io_error("rename_snapshot_temp", e))?;

    Ok(())
}
