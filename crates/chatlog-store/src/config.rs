//! Store configuration
//!
//! Loaded from TOML or built in code. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! snapshot_key = "chatlog.sqlite3"
//! runtime_asset = "/opt/app/sqlite3.wasm"
//! snapshot_dir = "/var/lib/app/snapshots"
//!
//! [persist]
//! mode = "every"
//! mutations = 10
//! ```

use crate::errors::Result;
use chatlog_core::ChatlogError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

pub const DEFAULT_SNAPSHOT_KEY: &str = "chatlog.sqlite3";

/// When mutations are written to the snapshot store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PersistCadence {
    /// Persist after every append and clear
    #[default]
    WriteThrough,
    /// Persist once every `mutations` appends; `clear` and `flush` always persist
    Every { mutations: NonZeroU32 },
}

impl PersistCadence {
    /// Whether `pending` unpersisted mutations should be written now
    pub fn is_due(&self, pending: u32) -> bool {
        match self {
            PersistCadence::WriteThrough => pending > 0,
            PersistCadence::Every { mutations } => pending >= mutations.get(),
        }
    }
}

/// Configuration for one conversation store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Key of the single conversation database in the snapshot store
    pub snapshot_key: String,
    /// Host-provided engine asset that must exist for the engine to load
    pub runtime_asset: Option<PathBuf>,
    /// Root directory for the filesystem snapshot store
    pub snapshot_dir: Option<PathBuf>,
    pub persist: PersistCadence,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            runtime_asset: None,
            snapshot_dir: None,
            persist: PersistCadence::default(),
        }
    }
}

impl StoreConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(text).map_err(|e| ChatlogError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::errors::io_error("read_config", e).with_key(path.display().to_string())
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = key.into();
        self
    }

    pub fn with_runtime_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_asset = Some(path.into());
        self
    }

    pub fn with_snapshot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(path.into());
        self
    }

    pub fn with_persist(mut self, persist: PersistCadence) -> Self {
        self.persist = persist;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.snapshot_key.trim().is_empty() {
            return Err(ChatlogError::InvalidConfig {
                reason: "snapshot_key must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
