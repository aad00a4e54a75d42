//! Canonical field keys and event names for structured logging
//!
//! Every log line emitted by the chatlog crates uses these keys, so log
//! consumers and the test capture layer can match on them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Store identifiers
pub const FIELD_SNAPSHOT_KEY: &str = "snapshot_key";
pub const FIELD_MESSAGE_ID: &str = "message_id";
pub const FIELD_ROLE: &str = "role";

// Sizes
pub const FIELD_SNAPSHOT_BYTES: &str = "snapshot_bytes";
pub const FIELD_CONTENT_LEN: &str = "content_len";
pub const FIELD_ROW_COUNT: &str = "row_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
