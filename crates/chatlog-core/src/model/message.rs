//! Conversational turn model
//!
//! Maps to the `messages` table. Ids and timestamps are assigned by the store,
//! never by callers.

use crate::errors::ChatlogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    /// Stored text form
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ChatlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            "system" => Ok(Role::System),
            other => Err(ChatlogError::UnknownRole {
                value: other.to_string(),
            }),
        }
    }
}

/// One persisted turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Engine-assigned, never reused within one engine lifetime
    pub id: i64,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch, set at insert time
    pub timestamp: i64,
}
