//! Message repository
//!
//! Owns the engine for one snapshot key: runs bootstrap exactly once, then
//! serves append/list/clear against the in-memory engine and mirrors every
//! mutation into the snapshot store.

mod message_repo;

pub use message_repo::MessageRepository;
