//! Pluggable remote text-generation backends
//!
//! The classifier only needs "send a prompt, get text back", so every
//! backend implements the small [`TextBackend`] trait.
//!
//! # Architecture
//!
//! - `TextBackend` trait: the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OllamaBackend`,
//!   `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AiConfig::load()?;
//! if let Some(client) = AIClient::from_config(&config)? {
//!     let reply = client.generate("...", &GenerationOptions::from(&config)).await?;
//! }
//! ```

mod gemini;
mod mock;
mod ollama;
mod openai_compatible;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockReply};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{AiConfig, BackendKind, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::{Error, Result};

/// Decoding knobs sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    /// Cap on reply length, in tokens
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl From<&AiConfig> for GenerationOptions {
    fn from(config: &AiConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Trait implemented by every text-generation backend
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Send one prompt and return the reply text
    ///
    /// Non-success statuses map to [`Error::Api`], a reply with no text to
    /// [`Error::EmptyResponse`].
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini (generateContent API)
    Gemini(GeminiBackend),
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build the configured backend
    ///
    /// Returns `Ok(None)` when the backend is missing its credentials
    /// (Gemini without an API key, Ollama without a host, ...).
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        if !config.has_credentials() {
            debug!(backend = %config.backend, "AI backend not configured");
            return Ok(None);
        }

        let host = config.host.as_deref().unwrap_or_default();
        let client = match config.backend {
            BackendKind::Gemini => {
                let api_key = config.api_key.as_deref().unwrap_or_default();
                AIClient::Gemini(GeminiBackend::new(
                    host,
                    &config.model,
                    api_key,
                    config.timeout,
                )?)
            }
            BackendKind::Ollama => {
                AIClient::Ollama(OllamaBackend::new(host, &config.model, config.timeout)?)
            }
            BackendKind::OpenAICompatible => AIClient::OpenAICompatible(
                OpenAICompatibleBackend::new(
                    host,
                    &config.model,
                    config.api_key.clone(),
                    config.timeout,
                )?,
            ),
            BackendKind::Mock => AIClient::Mock(MockBackend::new()),
        };

        Ok(Some(client))
    }

    /// Load [`AiConfig`] (override file + environment) and build from it
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_config(&AiConfig::load()?)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self {
            AIClient::Gemini(_) => BackendKind::Gemini,
            AIClient::Ollama(_) => BackendKind::Ollama,
            AIClient::OpenAICompatible(_) => BackendKind::OpenAICompatible,
            AIClient::Mock(_) => BackendKind::Mock,
        }
    }
}

// Delegate to the inner backend
#[async_trait]
impl TextBackend for AIClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.generate(prompt, options).await,
            AIClient::Ollama(b) => b.generate(prompt, options).await,
            AIClient::OpenAICompatible(b) => b.generate(prompt, options).await,
            AIClient::Mock(b) => b.generate(prompt, options).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Shared HTTP client with a whole-request timeout
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Turn a non-success response into [`Error::Api`]
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

/// Reject replies that carry no usable text
pub(crate) fn non_empty(text: Option<String>) -> Result<String> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or(Error::EmptyResponse)
}
