//! Narrative generation for the Dungeon Master.
//!
//! Two tiers: the OpenAI chat completion when a key is configured, and a
//! pool of scripted story beats otherwise (or whenever the upstream call
//! fails). The player-facing chat flow never hard-fails on a third-party
//! outage — `narrate` always produces text, tagged with its source.

use rand::seq::SliceRandom;

use crate::config::OpenAiConfig;
use crate::openai::OpenAiClient;

/// The fixed pool of canned story beats used in mock-only mode and as the
/// fallback when the upstream call fails.
pub const MOCK_NARRATIONS: [&str; 5] = [
    "You find yourself standing at the entrance of a dark, mysterious cave. The air is thick with an otherworldly mist, and you can hear strange echoes coming from within. What do you do?",
    "A goblin appears from behind a tree, wielding a rusty sword! Roll for initiative! The goblin's eyes glow with malicious intent as it prepares to attack.",
    "You discover a treasure chest hidden behind some rocks. It appears to be locked with an intricate magical mechanism. Do you attempt to pick the lock, or look for another way?",
    "The tavern is bustling with activity. A hooded figure in the corner catches your eye - they seem to be watching you intently. The barkeep approaches and offers you a drink.",
    "You hear the sound of rushing water ahead. As you round the corner, you see a magnificent waterfall cascading into a crystal-clear pool. Something glitters at the bottom of the water.",
];

/// Message substrings that trigger a scene illustration.
const ILLUSTRATION_TRIGGERS: [&str; 3] = ["enter", "look", "explore"];

#[derive(Debug, Default)]
pub struct MockNarrator;

impl MockNarrator {
    /// One story beat, chosen uniformly at random.
    pub fn narrate(&self) -> String {
        MOCK_NARRATIONS
            .choose(&mut rand::thread_rng())
            .expect("pool is non-empty")
            .to_string()
    }
}

/// Which tier produced the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSource {
    Upstream,
    Mock,
}

#[derive(Debug)]
pub struct DmReply {
    pub text: String,
    pub source: NarrativeSource,
}

/// Does the player's message describe a moment worth illustrating?
pub fn wants_illustration(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ILLUSTRATION_TRIGGERS.iter().any(|t| lowered.contains(t))
}

fn system_prompt(character_context: &str) -> String {
    format!(
        "You are an expert Dungeon Master for a single-player D&D campaign. Create engaging, immersive responses to player actions and choices.

Current Character: {character_context}

Guidelines:
- Always stay in character as the DM and friend
- Respond to player actions with vivid descriptions
- Create opportunities for adventure and choice
- Include dialogue from NPCs when appropriate
- Describe scenes in detail to enhance immersion
- Include dice rolls and game mechanics when appropriate
- Create dynamic encounters based on player choices
- Make the story feel personal and epic

Respond in a way that moves the story forward and gives the player meaningful choices."
    )
}

fn image_prompt(message: &str) -> String {
    format!(
        "Fantasy D&D scene: {message}. High quality digital art, detailed, atmospheric, cinematic lighting, fantasy art style."
    )
}

/// The Dungeon Master's narrator: OpenAI when configured, with graceful
/// degradation to the mock pool on any upstream failure.
pub struct DmNarrator {
    upstream: Option<OpenAiClient>,
    mock: MockNarrator,
}

impl DmNarrator {
    pub fn new(upstream: Option<OpenAiClient>) -> Self {
        Self {
            upstream,
            mock: MockNarrator,
        }
    }

    /// Build from configuration: upstream mode when an API key is present,
    /// mock-only mode otherwise.
    pub fn from_config(config: &OpenAiConfig) -> Self {
        let upstream = match OpenAiClient::new(config.clone()) {
            Ok(client) => Some(client),
            Err(crate::openai::UpstreamError::MissingApiKey) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build OpenAI client, running mock-only");
                None
            }
        };
        Self::new(upstream)
    }

    pub fn upstream_configured(&self) -> bool {
        self.upstream.is_some()
    }

    /// Produce the DM's narrative for one player message. Never fails:
    /// upstream errors are logged and masked by the mock pool.
    pub async fn narrate(&self, character_context: &str, message: &str) -> DmReply {
        let client = match &self.upstream {
            Some(c) => c,
            None => {
                return DmReply {
                    text: self.mock.narrate(),
                    source: NarrativeSource::Mock,
                }
            }
        };

        match client.chat(&system_prompt(character_context), message).await {
            Ok(text) => DmReply {
                text,
                source: NarrativeSource::Upstream,
            },
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI chat failed, falling back to scripted narration");
                DmReply {
                    text: self.mock.narrate(),
                    source: NarrativeSource::Mock,
                }
            }
        }
    }

    /// Attempt a scene illustration for the message. Returns `None` unless
    /// an upstream client is configured and the message contains one of the
    /// trigger words; upstream failures are logged and absorbed.
    pub async fn illustrate(&self, message: &str) -> Option<String> {
        let client = self.upstream.as_ref()?;
        if !wants_illustration(message) {
            return None;
        }

        match client.generate_image(&image_prompt(message)).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "Image generation failed, continuing without illustration");
                None
            }
        }
    }
}
