//! Core types shared across the chatlog facilities
//!
//! - **Schema constants**: canonical field keys and event names for logging
//! - **Sensitive data**: `Sensitive<T>` marker for redacting message text

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
