use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
        }
    }
}

/// OpenAI tuning knobs. The API key never comes from the config file —
/// only from the `OPENAI_API_KEY` environment variable.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub chat_model: String,
    pub image_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub image_size: String,
    pub image_quality: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            max_tokens: 400,
            temperature: 0.8,
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply the
    /// `PORT` and `OPENAI_API_KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;
        let mut cfg: AppConfig = s.try_deserialize()?;
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.service.port = port;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.openai.api_key = Some(key);
            }
        }
    }
}
