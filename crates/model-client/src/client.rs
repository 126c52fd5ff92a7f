//! Chat-completions client for remote emotion inference.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::prompt::{system_prompt, user_prompt};
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Error types for the model client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Response contained no completion")]
    EmptyResponse,

    #[error("Timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, ClientError>;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the model client.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API base URL.
    pub base_url: String,
    /// API key; `None` when no credential is configured.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(20),
            temperature: 0.2,
        }
    }
}

impl ModelConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("EMOTION_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("EMOTION_API_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("EMOTION_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("EMOTION_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }

    /// Whether an API credential is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Remote collaborator that turns text into a raw model response.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    /// Ask the model about `text`; returns the untrusted response body.
    async fn infer(&self, text: &str) -> Result<String>;
}

/// Chat-completions API client.
pub struct ModelClient {
    config: ModelConfig,
    http: Client,
}

impl ModelClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ModelConfig::from_env())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest::new(&self.config.model)
            .with_message(ChatMessage::system(system_prompt()))
            .with_message(ChatMessage::user(user_prompt(text)))
            .with_temperature(self.config.temperature)
            .with_max_tokens(800)
    }

    /// Single request, no retries: a failure is reported once and the caller
    /// decides how to degrade.
    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut builder = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                warn!("Rate limited by model API, retry after {}s", retry_after);
                Err(ClientError::RateLimited { retry_after })
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl EmotionModel for ModelClient {
    async fn infer(&self, text: &str) -> Result<String> {
        let request = self.build_request(text);
        debug!(model = %self.config.model, chars = text.len(), "requesting emotion inference");

        let response = self.send_request(&request).await?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or(ClientError::EmptyResponse)
    }
}
