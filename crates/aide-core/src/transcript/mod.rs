//! Chat transcript — persisted `{role, content}` log plus GUI formatting.
//!
//! - [`store::TranscriptStore`] — JSON array file, reset to `[]` on corruption
//! - [`format`] — query/answer normalization and GUI markup rendering

pub mod format;
pub mod store;

pub use format::{normalize_answer, normalize_query, TranscriptFormatter, END_OF_TURN};
pub use store::TranscriptStore;

use serde::{Deserialize, Serialize};

/// Role of a transcript message.
///
/// Roles other than `user` / `assistant` are kept verbatim so that a
/// load → save cycle never rewrites someone else's transcript entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// One entry of the chat log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

impl TranscriptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_string() {
        assert_eq!(Role::from("user".to_string()), Role::User);
        assert_eq!(Role::from("assistant".to_string()), Role::Assistant);
        assert_eq!(
            Role::from("system".to_string()),
            Role::Other("system".to_string())
        );
    }

    #[test]
    fn test_message_serializes_as_plain_role() {
        let json = serde_json::to_value(TranscriptMessage::assistant("Hi")).unwrap();
        assert_eq!(json, json!({"role": "assistant", "content": "Hi"}));
    }

    #[test]
    fn test_unknown_role_survives_round_trip() {
        let raw = json!({"role": "tool", "content": "42"});
        let msg: TranscriptMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.role.as_str(), "tool");
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }
}
