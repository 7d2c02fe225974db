//! Message and result domain types.
//!
//! These are the value objects that flow through the system:
//! the transport delivers an `InboundMessage`, the orchestrator produces an
//! `Outcome`, and the transport sends the final text back to the user.

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a conversation participant. Primary key for
/// all per-user state (activation, memory windows).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A message delivered by the transport collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Who sent it (platform-specific user ID)
    pub sender_id: UserId,

    /// The raw text body
    pub text: String,

    /// Group messages are ignored entirely by the core
    #[serde(default)]
    pub is_group: bool,
}

impl InboundMessage {
    /// Create a direct (non-group) message.
    pub fn direct(sender_id: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            is_group: false,
        }
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The product of one orchestration run. Produced once per request, consumed
/// by the transport, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// The text handed back to the user
    pub final_response: String,

    /// Auxiliary tags: which provider answered, which special path ran
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Outcome {
    /// An outcome with a single metadata tag.
    pub fn tagged(
        final_response: impl Into<String>,
        key: &str,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert(key.to_string(), value.into());
        Self {
            final_response: final_response.into(),
            metadata,
        }
    }

    /// Which provider produced the final response, if the general chain ran.
    pub fn responded_model(&self) -> Option<&str> {
        self.metadata.get("respondedModel").and_then(|v| v.as_str())
    }
}
