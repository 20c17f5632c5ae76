pub mod character;
pub mod quest;
pub mod session;
pub mod spell;

pub use character::Character;
pub use quest::Quest;
pub use session::{ChatMessage, GameSession, Role};
pub use spell::Spell;
