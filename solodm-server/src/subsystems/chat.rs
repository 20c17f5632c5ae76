//! DM chat orchestrator.
//!
//! Resolves the character context, asks the narrator for the story beat
//! (upstream or mock), conditionally attempts a scene illustration, records
//! the exchange on the session, and shapes the response body. Upstream
//! failures never fail the request; only a missing player message does.

use serde::{Deserialize, Serialize};

use solodm_core::models::{Character, ChatMessage, GameSession};
use solodm_core::narrative::NarrativeSource;
use solodm_core::{DmNarrator, GameError, GameStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub character_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub dm_response: DmResponseBody,
    pub session: GameSession,
}

/// `imageUrl` is serialized even when absent (as `null`) to keep the wire
/// shape stable for clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmResponseBody {
    pub message: String,
    pub image_url: Option<String>,
}

/// Advisory context line handed to the system prompt. A missing character
/// never fails the request.
fn character_context(character: Option<&Character>) -> String {
    match character {
        Some(c) => format!(
            "Character: {}, Level {} {} {}. HP: {}/{}, AC: {}",
            c.attr_display("name"),
            c.attr_display("level"),
            c.attr_display("race"),
            c.attr_display("class"),
            c.attr_display("currentHp"),
            c.attr_display("maxHp"),
            c.attr_display("armorClass"),
        ),
        None => "Unknown character".to_string(),
    }
}

pub async fn handle_chat(
    store: &GameStore,
    narrator: &DmNarrator,
    request: ChatRequest,
) -> Result<ChatResponse, GameError> {
    let message = match request.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return Err(GameError::Validation("Message is required".to_string())),
    };

    let character = request
        .character_id
        .as_deref()
        .and_then(|id| store.character(id));
    let context = character_context(character.as_ref());

    let reply = narrator.narrate(&context, &message).await;

    // Illustrations only ride on a successful upstream narration, matching
    // the trigger-word gate inside `illustrate`.
    let image_url = if reply.source == NarrativeSource::Upstream {
        narrator.illustrate(&message).await
    } else {
        None
    };

    let user_message = ChatMessage::user(message);
    let assistant_message = ChatMessage::assistant(reply.text.clone(), image_url.clone());
    let session = store.record_exchange(
        request.session_id,
        request.character_id,
        user_message,
        assistant_message,
    );

    Ok(ChatResponse {
        dm_response: DmResponseBody {
            message: reply.text,
            image_url,
        },
        session,
    })
}
