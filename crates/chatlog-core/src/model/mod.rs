//! Domain model
//!
//! - [`ChatMessage`] and [`Role`]: one conversational turn
//! - [`EngineHealth`]: queryable state of the store's engine

pub mod health;
pub mod message;

pub use health::{BootSource, EngineHealth, EngineState};
pub use message::{ChatMessage, Role};
