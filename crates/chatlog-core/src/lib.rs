//! Chatlog Core - shared foundations for the conversation store
//!
//! - Structured error facility (`ExError`, `ExErrorKind`) and domain errors
//! - Logging facility with operation-boundary macros and test capture
//! - Domain model: chat turns, roles, engine health

pub mod errors;
pub mod logging_facility;
pub mod model;

/// Re-exported so the logging macros resolve field constants from any crate
pub use chatlog_core_types as types;

pub use errors::{ChatlogError, ExError, ExErrorKind, Result};
pub use model::{BootSource, ChatMessage, EngineHealth, EngineState, Role};
