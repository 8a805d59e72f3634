//! Mock backend for testing
//!
//! Replies with a scripted outcome and records every prompt it receives,
//! so tests can check both the classification and whether a call happened.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{GenerationOptions, TextBackend};

/// What the mock does when asked to generate
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this text
    Text(String),
    /// Fail as if the server answered with this HTTP status
    Status(u16),
    /// Fail as if the payload carried no text
    Empty,
}

#[derive(Clone)]
pub struct MockBackend {
    reply: MockReply,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Healthy mock answering "other"
    pub fn new() -> Self {
        Self::with_reply(MockReply::Text("other".to_string()))
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            delay: None,
            healthy: true,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock answering `text` verbatim
    pub fn replying(text: &str) -> Self {
        Self::with_reply(MockReply::Text(text.to_string()))
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Number of generate calls so far (shared across clones)
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Status(status) => Err(Error::Api {
                status: *status,
                body: "mock failure".to_string(),
            }),
            MockReply::Empty => Err(Error::EmptyResponse),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
