use crate::db;
use crate::errors::{engine_unavailable, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::PathBuf;

/// Oldest SQLite (3.36.0) with serialize/deserialize compiled in by default
pub const MIN_SQLITE_VERSION: i32 = 3_036_000;

/// Source of engine instances
///
/// Every failure must come back as `ExErrorKind::EngineUnavailable`; the
/// bootstrapper turns it into a degraded store rather than an error.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Produce an empty engine
    async fn load(&self) -> Result<Connection>;
}

/// Loader for the SQLite library linked into this binary
///
/// When a runtime asset is configured, the host is expected to ship the engine
/// there; a missing asset means the engine is unavailable on this host.
#[derive(Debug, Clone, Default)]
pub struct SqliteRuntimeLoader {
    runtime_asset: Option<PathBuf>,
}

impl SqliteRuntimeLoader {
    pub fn new(runtime_asset: Option<PathBuf>) -> Self {
        Self { runtime_asset }
    }
}

#[async_trait]
impl EngineLoader for SqliteRuntimeLoader {
    async fn load(&self) -> Result<Connection> {
        if let Some(asset) = &self.runtime_asset {
            let present = tokio::fs::try_exists(asset).await.unwrap_or(false);
            if !present {
                return Err(engine_unavailable(format!(
                    "runtime asset missing at {}",
                    asset.display()
                )));
            }
        }

        let version = rusqlite::version_number();
        if version < MIN_SQLITE_VERSION {
            return Err(engine_unavailable(format!(
                "unsupported host: SQLite {} lacks image serialization",
                rusqlite::version()
            )));
        }

        db::open_in_memory()
            .map_err(|e| engine_unavailable("could not open in-memory engine").with_source(e))
    }
}
