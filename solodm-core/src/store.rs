//! In-memory game data store.
//!
//! All collections live behind one `RwLock`; nothing persists across a
//! restart. The store is an explicit struct handed to handlers through
//! shared state, never a module-level singleton, so tests get a fresh
//! instance each and a real persistence layer can replace it later.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::RwLock;

use crate::ids;
use crate::models::{Character, ChatMessage, GameSession, Quest, Spell};

#[derive(Default)]
struct Collections {
    characters: Vec<Character>,
    sessions: Vec<GameSession>,
    quests: Vec<Quest>,
    spells: Vec<Spell>,
}

#[derive(Default)]
pub struct GameStore {
    inner: RwLock<Collections>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_character(&self, attrs: Map<String, Value>) -> Character {
        let character = Character::new(attrs);
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.characters.push(character.clone());
        character
    }

    pub fn characters(&self) -> Vec<Character> {
        self.inner.read().expect("store lock poisoned").characters.clone()
    }

    pub fn character(&self, id: &str) -> Option<Character> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.characters.iter().find(|c| c.id == id).cloned()
    }

    pub fn session(&self, id: &str) -> Option<GameSession> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.sessions.iter().find(|s| s.id == id).cloned()
    }

    pub fn sessions_for_character(&self, character_id: &str) -> Vec<GameSession> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .sessions
            .iter()
            .filter(|s| s.character_id.as_deref() == Some(character_id))
            .cloned()
            .collect()
    }

    /// Append one player/DM exchange to a session, creating the session if
    /// the id is unknown (or absent). Runs under a single write-lock
    /// acquisition: concurrent chats on the same session id cannot create
    /// divergent sessions, and the two messages of one exchange are always
    /// adjacent and in (user, assistant) order. `last_updated` is bumped in
    /// the same critical section.
    pub fn record_exchange(
        &self,
        session_id: Option<String>,
        character_id: Option<String>,
        user: ChatMessage,
        assistant: ChatMessage,
    ) -> GameSession {
        let mut inner = self.inner.write().expect("store lock poisoned");

        let position = session_id
            .as_deref()
            .and_then(|id| inner.sessions.iter().position(|s| s.id == id));
        let position = match position {
            Some(p) => p,
            None => {
                inner.sessions.push(GameSession::new(session_id, character_id));
                inner.sessions.len() - 1
            }
        };

        let session = &mut inner.sessions[position];
        session.messages.push(user);
        session.messages.push(assistant);
        session.last_updated = Utc::now();
        session.clone()
    }

    pub fn add_quest(&self, attrs: Map<String, Value>) -> Quest {
        let quest = Quest::new(attrs);
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.quests.push(quest.clone());
        quest
    }

    pub fn quests(&self) -> Vec<Quest> {
        self.inner.read().expect("store lock poisoned").quests.clone()
    }

    pub fn spells(&self) -> Vec<Spell> {
        self.inner.read().expect("store lock poisoned").spells.clone()
    }

    /// Load the fixed seed records so the API is exercisable immediately:
    /// two reference spells and a sample level-1 fighter.
    pub fn seed(&self) {
        let mut inner = self.inner.write().expect("store lock poisoned");

        inner.spells = vec![
            Spell {
                id: ids::generate_id(),
                name: "Fireball".to_string(),
                level: 3,
                school: "evocation".to_string(),
                casting_time: "1 action".to_string(),
                range: "150 feet".to_string(),
                components: "V, S, M (a tiny ball of bat guano and sulfur)".to_string(),
                duration: "Instantaneous".to_string(),
                description: "A bright streak flashes from your pointing finger to a point \
                              you choose within range and then blossoms with a low roar into \
                              an explosion of flame."
                    .to_string(),
                ritual: false,
                concentration: false,
            },
            Spell {
                id: ids::generate_id(),
                name: "Cure Wounds".to_string(),
                level: 1,
                school: "evocation".to_string(),
                casting_time: "1 action".to_string(),
                range: "Touch".to_string(),
                components: "V, S".to_string(),
                duration: "Instantaneous".to_string(),
                description: "A creature you touch regains a number of hit points equal to \
                              1d8 + your spellcasting ability modifier."
                    .to_string(),
                ritual: false,
                concentration: false,
            },
        ];

        let sample = json!({
            "name": "Adventurer",
            "class": "Fighter",
            "level": 1,
            "race": "Human",
            "background": "Soldier",
            "strength": 16,
            "dexterity": 14,
            "constitution": 15,
            "intelligence": 12,
            "wisdom": 13,
            "charisma": 10,
            "currentHp": 12,
            "maxHp": 12,
            "armorClass": 16,
            "proficiencyBonus": 2,
            "currentXp": 0
        });
        let attrs = sample.as_object().cloned().unwrap_or_default();
        inner.characters.push(Character::new(attrs));
    }
}
