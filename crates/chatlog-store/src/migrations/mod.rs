//! Schema management
//!
//! - Embedded SQL migrations with checksums and idempotent application
//! - `ensure_schema`: migrate an engine and make the result durable

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations, AppliedMigration};

use crate::errors::Result;
use crate::snapshot::{persist_snapshot, SnapshotStore};
use rusqlite::Connection;

/// Bring the engine's schema up to date and persist if anything changed
///
/// On an empty engine this creates the `messages` table and its timestamp
/// index, then writes a snapshot so the initialized-but-empty database is
/// durable. On an engine that already has every migration it does nothing,
/// including no write. Returns the number of migrations applied.
pub async fn ensure_schema(
    conn: &mut Connection,
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<usize> {
    let applied = apply_migrations(conn)?;

    if applied > 0 {
        persist_snapshot(conn, store, key).await?;
        tracing::info!(snapshot_key = key, applied, "Schema initialized");
    }

    Ok(applied)
}
