//! Conversational memory domain types.
//!
//! The store itself lives in `cascata-memory`; the entry type is defined
//! here so providers can accept recent context without depending on the
//! store implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (prompt, response) exchange retained in a user's sliding window.
///
/// Owned exclusively by the memory store; callers only ever see clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// The prompt as the user sent it
    pub prompt: String,

    /// The response that was delivered
    pub response: String,

    /// When the exchange completed
    pub timestamp: DateTime<Utc>,
}

impl MemoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}
