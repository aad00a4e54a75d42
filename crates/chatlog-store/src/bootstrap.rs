//! Engine bootstrap
//!
//! One pass of: load the engine runtime, try the prior snapshot, fall back to
//! a fresh schema. Every fault ends in an outcome value; nothing here panics
//! or returns an error to the caller. Running it once per repository is the
//! repository's job.

use crate::engine::EngineLoader;
use crate::errors::{corrupt_snapshot, Result};
use crate::migrations::ensure_schema;
use crate::snapshot::{import_image, SnapshotStore};
use chatlog_core::errors::{ExError, ExErrorKind};
use chatlog_core::model::BootSource;
use chatlog_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;
use std::time::Instant;

/// Terminal result of a bootstrap pass
pub enum BootOutcome {
    Ready {
        conn: Connection,
        source: BootSource,
        /// Why the prior snapshot was discarded, when `source` is `Recovered`
        recovered_from: Option<ExError>,
    },
    Degraded(ExError),
}

impl std::fmt::Debug for BootOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootOutcome::Ready {
                source,
                recovered_from,
                ..
            } => f
                .debug_struct("Ready")
                .field("source", source)
                .field("recovered_from", recovered_from)
                .finish_non_exhaustive(),
            BootOutcome::Degraded(reason) => f.debug_tuple("Degraded").field(reason).finish(),
        }
    }
}

/// Produce a ready engine for `key`, or the reason there cannot be one
///
/// 1. Load the runtime; failure degrades.
/// 2. Read the prior snapshot; a read failure degrades (a fresh schema would
///    overwrite a snapshot that may be perfectly valid).
/// 3. If bytes exist, rebuild the engine from them; an unusable image is
///    logged and discarded.
/// 4. Otherwise (or after discarding) migrate the loaded empty engine and
///    persist it; a failed persist degrades.
pub async fn bootstrap(
    loader: &dyn EngineLoader,
    store: &dyn SnapshotStore,
    key: &str,
) -> BootOutcome {
    let start = Instant::now();
    log_op_start!("bootstrap", snapshot_key = key);

    let outcome = run(loader, store, key).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        BootOutcome::Ready { source, .. } => {
            log_op_end!(
                "bootstrap",
                duration_ms = duration_ms,
                snapshot_key = key,
                boot_source = ?source
            );
        }
        BootOutcome::Degraded(reason) => {
            log_op_error!(
                "bootstrap",
                reason.clone(),
                duration_ms = duration_ms,
                snapshot_key = key
            );
        }
    }

    outcome
}

async fn run(loader: &dyn EngineLoader, store: &dyn SnapshotStore, key: &str) -> BootOutcome {
    let mut conn = match loader.load().await {
        Ok(conn) => conn,
        Err(e) => return BootOutcome::Degraded(e),
    };

    let prior = match store.get(key).await {
        Ok(prior) => prior,
        Err(e) => return BootOutcome::Degraded(e),
    };

    let mut recovered_from = None;
    if let Some(bytes) = prior {
        match restore(store, key, &bytes).await {
            Ok(restored) => {
                return BootOutcome::Ready {
                    conn: restored,
                    source: BootSource::Restored,
                    recovered_from: None,
                }
            }
            Err(e) if e.kind() == ExErrorKind::CorruptSnapshot => {
                tracing::warn!(
                    op = "restore_snapshot",
                    snapshot_key = key,
                    snapshot_bytes = bytes.len(),
                    err.code = e.code(),
                    error = %e,
                    "Discarding unusable snapshot; starting with an empty history"
                );
                recovered_from = Some(e);
            }
            Err(e) => return BootOutcome::Degraded(e),
        }
    }

    if let Err(e) = ensure_schema(&mut conn, store, key).await {
        return BootOutcome::Degraded(e);
    }

    let source = if recovered_from.is_some() {
        BootSource::Recovered
    } else {
        BootSource::Fresh
    };

    BootOutcome::Ready {
        conn,
        source,
        recovered_from,
    }
}

/// Rebuild an engine from snapshot bytes and bring its schema current
///
/// A snapshot whose migration ledger disagrees with this build is treated
/// like any other unusable image.
async fn restore(store: &dyn SnapshotStore, key: &str, bytes: &[u8]) -> Result<Connection> {
    let mut conn = import_image(key, bytes)?;

    match ensure_schema(&mut conn, store, key).await {
        Ok(_) => Ok(conn),
        Err(e) if e.kind() == ExErrorKind::Migration => {
            Err(corrupt_snapshot(key, "schema ledger is incompatible").with_source(e))
        }
        Err(e) => Err(e),
    }
}
