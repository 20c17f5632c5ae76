use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// One continuous play-through: the conversation transcript plus location
/// state, tied (weakly) to one character. `messages` is append-only and
/// ordered by insertion; `last_updated` is monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub character_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub current_location: String,
    pub location_description: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl GameSession {
    /// A fresh session at the fixed starting location. `id` is the
    /// caller-supplied session id when present, otherwise generated.
    pub fn new(id: Option<String>, character_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.unwrap_or_else(ids::generate_id),
            character_id,
            messages: Vec::new(),
            current_location: "Starting Area".to_string(),
            location_description: "A peaceful meadow where your adventure begins".to_string(),
            created_at: now,
            last_updated: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            id: ids::generate_id(),
            role: Role::User,
            content,
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    pub fn assistant(content: String, image_url: Option<String>) -> Self {
        Self {
            id: ids::generate_id(),
            role: Role::Assistant,
            content,
            timestamp: Utc::now(),
            image_url,
        }
    }
}
