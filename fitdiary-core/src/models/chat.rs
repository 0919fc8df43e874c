use serde::{Deserialize, Serialize};

use super::profile::Profile;
use crate::api::wire;

/// A message in the coaching conversation.
///
/// Coach replies are posted by the backend under its own sender id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::id")]
    pub sender_id: String,
    pub message: String,
    pub created_at: String,
}

impl ChatMessage {
    /// True if the message was written by the given user.
    pub fn is_from(&self, profile: &Profile) -> bool {
        self.sender_id == profile.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_from_matches_numeric_ids() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"id": 1, "sender_id": 12, "message": "hi", "created_at": "2025-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        let profile: Profile =
            serde_json::from_str(r#"{"id": "12", "name": "Ana", "email": "a@x.com"}"#).unwrap();
        assert!(msg.is_from(&profile));

        let coach: ChatMessage = serde_json::from_str(
            r#"{"id": 2, "sender_id": 0, "message": "hello", "created_at": "2025-01-01T10:00:05Z"}"#,
        )
        .unwrap();
        assert!(!coach.is_from(&profile));
    }
}
