//! Catat Core Library
//!
//! Shared functionality for the Catat finance entry assistant:
//! - Indonesian amount notation parsing (`50rb`, `1.5jt`, `Rp 50.000`)
//! - Splitting free-text entries into description and amount
//! - Keyword categorization with fuzzy matching for typos
//! - Learned keyword mappings (SQLite or in-memory)
//! - Remote AI classification with learning (Gemini, Ollama, OpenAI-compatible)
//! - Prompt library for customizable AI prompts

pub mod ai;
pub mod amount;
pub mod categorize;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod fuzzy;
pub mod keywords;
pub mod models;
pub mod prompts;
pub mod split;
pub mod store;

/// Test utilities including mock AI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, GeminiBackend, GenerationOptions, MockBackend, MockReply, OllamaBackend,
    OpenAICompatibleBackend, TextBackend,
};
pub use amount::parse_amount;
pub use categorize::{categorize_from_defaults, Categorizer};
pub use classifier::{extract_keyword, parse_category_reply, RemoteClassifier};
pub use config::{AiConfig, BackendKind};
pub use db::Database;
pub use error::{ClassificationFault, Error, ParseError, Result};
pub use fuzzy::{find_best_match, levenshtein_distance, string_similarity, FuzzyMatch};
pub use models::{Category, CategoryMatch, LearnedMapping, MatchSource, ParsedInput};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use split::{split_input, try_split_input};
pub use store::{InMemoryMappingStore, MappingStore};
