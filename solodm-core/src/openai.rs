//! OpenAI client for the two upstream capabilities the DM uses:
//! chat completions for narrative text and image generations for scene
//! illustrations. No retries — failures are absorbed by the caller's
//! fallback path, never retried here.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::OpenAiConfig;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Response contained no completion choices")]
    EmptyResponse,

    #[error("Response contained no image URL")]
    MissingImageUrl,
}

// ============================================================================
// OpenAI API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessageDto>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessageDto {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageDto,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// OpenAiClient
// ============================================================================

pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, UpstreamError> {
        Self::with_base_url(config, "https://api.openai.com/v1".to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(config: OpenAiConfig, base_url: String) -> Result<Self, UpstreamError> {
        let api_key = match config.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k.to_string(),
            _ => return Err(UpstreamError::MissingApiKey),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
            base_url,
        })
    }

    /// Generate the DM's narrative for one player message.
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages: vec![
                ChatMessageDto {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessageDto {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(UpstreamError::EmptyResponse)
    }

    /// Generate exactly one square scene illustration and return its URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/images/generations", self.base_url);
        let request = ImageGenerationRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.config.image_size.clone(),
            quality: self.config.image_quality.clone(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let generated: ImageGenerationResponse = response.json().await?;
        generated
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or(UpstreamError::MissingImageUrl)
    }

    /// Map a non-2xx response to `UpstreamError::Api`, decoding the OpenAI
    /// error body when possible.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OpenAiErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .map(|e| e.message)
            .unwrap_or(error_body);

        tracing::error!(code = status.as_u16(), message = %message, "OpenAI API error");

        Err(UpstreamError::Api {
            code: status.as_u16(),
            message,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
