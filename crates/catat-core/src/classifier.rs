//! Remote AI classification with learning
//!
//! [`RemoteClassifier::classify`] always produces a [`Category`]. Every
//! failure (no credentials, timeout, HTTP status, transport, empty or
//! unrecognizable reply) is collapsed to [`Category::Other`] in exactly one
//! place, after being logged with its [`ClassificationFault::kind`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{AIClient, GenerationOptions, TextBackend};
use crate::config::{AiConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{ClassificationFault, Error, Result};
use crate::models::Category;
use crate::prompts::{PromptId, PromptLibrary};
use crate::store::MappingStore;

/// Classifies descriptions through a remote text-generation backend
pub struct RemoteClassifier {
    ai: Option<AIClient>,
    store: Arc<dyn MappingStore>,
    prompts: Arc<RwLock<PromptLibrary>>,
    options: GenerationOptions,
    timeout: Duration,
}

impl RemoteClassifier {
    /// Classifier with default decoding options and timeout
    ///
    /// `ai: None` yields an unconfigured classifier that never makes a call.
    pub fn new(ai: Option<AIClient>, store: Arc<dyn MappingStore>) -> Self {
        Self {
            ai,
            store,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            options: GenerationOptions::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build the backend, options and timeout from configuration
    pub fn from_config(config: &AiConfig, store: Arc<dyn MappingStore>) -> Result<Self> {
        let ai = AIClient::from_config(config)?;
        Ok(Self::new(ai, store)
            .with_options(GenerationOptions::from(config))
            .with_timeout(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Whether a backend with credentials is available
    pub fn is_configured(&self) -> bool {
        self.ai.is_some()
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify a description, never failing
    ///
    /// With `persist_learning`, a successful non-`other` result is stored
    /// under the description's representative keyword; storage errors are
    /// logged and ignored.
    pub async fn classify(&self, description: &str, persist_learning: bool) -> Category {
        let category = match self.try_classify(description).await {
            Ok(category) => category,
            Err(fault) => {
                match &fault {
                    ClassificationFault::MissingCredentials => {
                        warn!("Remote classification skipped: no AI credentials configured")
                    }
                    ClassificationFault::HttpStatus { status, .. } => warn!(
                        kind = fault.kind(),
                        status = *status,
                        "Remote classification failed for '{}'",
                        description
                    ),
                    _ => warn!(
                        kind = fault.kind(),
                        "Remote classification failed for '{}': {}",
                        description,
                        fault
                    ),
                }
                return Category::Other;
            }
        };

        debug!("Remote classified '{}': {}", description, category);

        if persist_learning && category.is_match() {
            self.learn_from(description, category).await;
        }

        category
    }

    /// One classification attempt, reporting why it failed
    ///
    /// No retries; the whole call is bounded by the configured timeout.
    pub async fn try_classify(
        &self,
        description: &str,
    ) -> std::result::Result<Category, ClassificationFault> {
        let ai = self
            .ai
            .as_ref()
            .ok_or(ClassificationFault::MissingCredentials)?;

        let prompt = self
            .build_prompt(description)
            .map_err(ClassificationFault::Backend)?;

        let reply = tokio::time::timeout(self.timeout, ai.generate(&prompt, &self.options))
            .await
            .map_err(|_| ClassificationFault::Timeout)??;

        parse_category_reply(&reply)
            .ok_or_else(|| ClassificationFault::Unrecognized(reply.trim().to_string()))
    }

    fn build_prompt(&self, description: &str) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(PromptId::ClassifyCategory)?;

        let categories = Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut vars = HashMap::new();
        vars.insert("description", description);
        vars.insert("categories", categories.as_str());
        Ok(template.render(&vars))
    }

    async fn learn_from(&self, description: &str, category: Category) {
        let Some(keyword) = extract_keyword(description) else {
            debug!("No keyword to learn from '{}'", description);
            return;
        };

        match self.store.upsert(&keyword, category).await {
            Ok(mapping) => info!(
                keyword = %mapping.keyword,
                category = %mapping.category,
                count = mapping.count,
                "Learned mapping from remote classification"
            ),
            Err(e) => warn!(keyword = %keyword, "Failed to persist learned mapping: {}", e),
        }
    }
}

/// Pull a category out of free-form reply text
///
/// An exact (trimmed, case-insensitive) category name wins; otherwise the
/// first category in [`Category::ALL`] order that appears anywhere in the
/// reply.
pub fn parse_category_reply(reply: &str) -> Option<Category> {
    let text = reply.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Ok(category) = text.parse::<Category>() {
        return Some(category);
    }

    Category::ALL
        .iter()
        .copied()
        .find(|category| text.contains(category.as_str()))
}

/// Representative keyword of a description
///
/// The first whitespace-separated token that does not start with a digit and
/// is at least two characters long, lowercased.
pub fn extract_keyword(description: &str) -> Option<String> {
    description
        .split_whitespace()
        .find(|token| {
            !token.starts_with(|c: char| c.is_ascii_digit()) && token.chars().count() >= 2
        })
        .map(str::to_lowercase)
}
