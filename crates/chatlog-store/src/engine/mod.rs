//! Engine runtime loading
//!
//! Produces the in-memory SQLite connection every other component executes
//! statements on.

mod loader;

pub use loader::{EngineLoader, SqliteRuntimeLoader, MIN_SQLITE_VERSION};
