//! Description → category
//!
//! A description is lowercased and split on whitespace, then four full
//! passes run over the word list, each returning on its first hit:
//!
//! 1. learned mappings from the store
//! 2. exact keyword table hits
//! 3. keyword table substring containment
//! 4. keyword table fuzzy matches
//!
//! A tier covers the whole phrase before the next tier starts, so in
//! "kopi bensinnya" the exact hit on "kopi" beats the substring hit on
//! "bensinnya" regardless of which is the stronger word. Within a tier the
//! earlier word wins. If nothing matches locally, the remote classifier
//! gets a chance, and the final fallback is `other`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::classifier::{extract_keyword, RemoteClassifier};
use crate::error::{Error, Result};
use crate::keywords::{exact_match, fuzzy_match, substring_match, KeywordHit};
use crate::models::{Category, CategoryMatch, LearnedMapping, MatchSource};
use crate::store::MappingStore;

fn split_words(description: &str) -> Vec<String> {
    description
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn table_match(hit: KeywordHit, source: MatchSource) -> CategoryMatch {
    CategoryMatch {
        similarity: hit.similarity,
        ..CategoryMatch::new(hit.category, source, hit.keyword)
    }
}

fn exact_pass(words: &[String]) -> Option<CategoryMatch> {
    words
        .iter()
        .find_map(|w| exact_match(w))
        .map(|hit| table_match(hit, MatchSource::Exact))
}

fn substring_pass(words: &[String]) -> Option<CategoryMatch> {
    words
        .iter()
        .find_map(|w| substring_match(w))
        .map(|hit| table_match(hit, MatchSource::Substring))
}

fn fuzzy_pass(words: &[String]) -> Option<CategoryMatch> {
    words
        .iter()
        .find_map(|w| fuzzy_match(w))
        .map(|hit| table_match(hit, MatchSource::Fuzzy))
}

/// Passes 2-4 over an already split word list
fn static_passes(words: &[String]) -> Option<CategoryMatch> {
    exact_pass(words)
        .or_else(|| substring_pass(words))
        .or_else(|| fuzzy_pass(words))
}

/// Categorize a description using only the built-in keyword table
pub fn categorize_from_defaults(description: &str) -> Option<Category> {
    static_passes(&split_words(description)).map(|m| m.category)
}

/// Layered categorizer: learned mappings, keyword table, then remote AI
pub struct Categorizer {
    store: Arc<dyn MappingStore>,
    remote: RemoteClassifier,
}

impl Categorizer {
    pub fn new(store: Arc<dyn MappingStore>, remote: RemoteClassifier) -> Self {
        Self { store, remote }
    }

    /// Categorizer with no remote backend
    pub fn local_only(store: Arc<dyn MappingStore>) -> Self {
        let remote = RemoteClassifier::new(None, store.clone());
        Self { store, remote }
    }

    pub fn store(&self) -> &Arc<dyn MappingStore> {
        &self.store
    }

    pub fn remote(&self) -> &RemoteClassifier {
        &self.remote
    }

    /// Learned mapping for one word; store failures count as a miss
    async fn learned(&self, word: &str) -> Option<LearnedMapping> {
        match self.store.get(word).await {
            Ok(Some(mapping)) if mapping.category.is_match() => Some(mapping),
            Ok(_) => None,
            Err(e) => {
                warn!("Learned mapping lookup failed for '{}': {}", word, e);
                None
            }
        }
    }

    async fn learned_pass(&self, words: &[String]) -> Option<CategoryMatch> {
        for word in words {
            if let Some(mapping) = self.learned(word).await {
                return Some(CategoryMatch::new(
                    mapping.category,
                    MatchSource::Learned,
                    &mapping.keyword,
                ));
            }
        }
        None
    }

    /// Resolve a single word: learned, exact, substring, then fuzzy
    pub async fn categorize_word(&self, word: &str) -> Option<Category> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return None;
        }
        if let Some(mapping) = self.learned(&word).await {
            return Some(mapping.category);
        }
        crate::keywords::categorize_word_sync(&word)
    }

    /// Local categorization with provenance
    pub async fn categorize_detailed(&self, description: &str) -> Option<CategoryMatch> {
        let words = split_words(description);
        if words.is_empty() {
            return None;
        }

        let found = match self.learned_pass(&words).await {
            Some(m) => Some(m),
            None => static_passes(&words),
        };

        match &found {
            Some(m) => debug!(
                source = %m.source,
                keyword = m.keyword.as_deref().unwrap_or_default(),
                "Categorized '{}' as {}",
                description,
                m.category
            ),
            None => debug!("No local match for '{}'", description),
        }
        found
    }

    /// Local categorization: learned mappings and the keyword table
    pub async fn categorize(&self, description: &str) -> Option<Category> {
        self.categorize_detailed(description)
            .await
            .map(|m| m.category)
    }

    /// Local first, then remote (when allowed and configured), then `other`
    pub async fn categorize_with_fallback_detailed(
        &self,
        description: &str,
        use_remote: bool,
    ) -> CategoryMatch {
        if let Some(found) = self.categorize_detailed(description).await {
            return found;
        }

        if use_remote && self.remote.is_configured() && !description.trim().is_empty() {
            let category = self.remote.classify(description, true).await;
            if category.is_match() {
                return CategoryMatch::without_keyword(category, MatchSource::Remote);
            }
        }

        debug!("Falling back to 'other' for '{}'", description);
        CategoryMatch::without_keyword(Category::Other, MatchSource::Fallback)
    }

    /// Always returns a category; `other` when nothing matched
    pub async fn categorize_with_fallback(&self, description: &str, use_remote: bool) -> Category {
        self.categorize_with_fallback_detailed(description, use_remote)
            .await
            .category
    }

    /// Store a manual keyword→category mapping
    ///
    /// `other` is the fallback and cannot be learned.
    pub async fn learn(&self, keyword: &str, category: Category) -> Result<LearnedMapping> {
        if !category.is_match() {
            return Err(Error::InvalidData(
                "'other' is the fallback category and cannot be learned".to_string(),
            ));
        }
        let keyword = keyword.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(Error::InvalidData(format!(
                "keyword must be a single word, got '{}'",
                keyword
            )));
        }
        self.store.upsert(keyword, category).await
    }

    /// Correct the category of a whole description
    ///
    /// Learns under the same representative keyword the remote path uses.
    pub async fn correct(&self, description: &str, category: Category) -> Result<LearnedMapping> {
        let keyword = extract_keyword(description).ok_or_else(|| {
            Error::InvalidData(format!("no keyword to learn in '{}'", description))
        })?;
        self.learn(&keyword, category).await
    }
}
