pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod narrative;
pub mod openai;
pub mod store;

pub use config::{AppConfig, OpenAiConfig, ServiceConfig};
pub use error::GameError;
pub use narrative::{DmNarrator, DmReply, MockNarrator, NarrativeSource, MOCK_NARRATIONS};
pub use openai::{OpenAiClient, UpstreamError};
pub use store::GameStore;
