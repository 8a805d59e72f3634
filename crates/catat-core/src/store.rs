//! Learned keyword→category mappings
//!
//! The categorizer only needs a small key-value capability set, so the
//! storage backend sits behind [`MappingStore`]. [`Database`](crate::db::Database)
//! persists to SQLite; [`InMemoryMappingStore`] is for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{Category, LearnedMapping};

/// Keys are single lowercase words
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Storage for learned mappings
///
/// Implementations serialize their own writes. Every method normalizes the
/// keyword with [`normalize_keyword`] before touching storage.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Look up a keyword
    async fn get(&self, keyword: &str) -> Result<Option<LearnedMapping>>;

    /// Create with count 1, or bump the count and overwrite the category
    async fn upsert(&self, keyword: &str, category: Category) -> Result<LearnedMapping>;

    /// All mappings, most reinforced first
    async fn list(&self) -> Result<Vec<LearnedMapping>>;

    /// Delete a mapping, returning whether it existed
    async fn remove(&self, keyword: &str) -> Result<bool>;
}

/// Process-local store backed by a `HashMap`
#[derive(Default)]
pub struct InMemoryMappingStore {
    mappings: RwLock<HashMap<String, LearnedMapping>>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with `(keyword, category)` pairs, each at count 1
    pub fn with_mappings<'a>(pairs: impl IntoIterator<Item = (&'a str, Category)>) -> Self {
        let now = Utc::now();
        let mappings = pairs
            .into_iter()
            .map(|(keyword, category)| {
                let keyword = normalize_keyword(keyword);
                let mapping = LearnedMapping {
                    keyword: keyword.clone(),
                    category,
                    count: 1,
                    created_at: now,
                    updated_at: now,
                };
                (keyword, mapping)
            })
            .collect();

        Self {
            mappings: RwLock::new(mappings),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::InvalidData("mapping store lock poisoned".to_string())
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn get(&self, keyword: &str) -> Result<Option<LearnedMapping>> {
        let mappings = self.mappings.read().map_err(poisoned)?;
        Ok(mappings.get(&normalize_keyword(keyword)).cloned())
    }

    async fn upsert(&self, keyword: &str, category: Category) -> Result<LearnedMapping> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Err(Error::InvalidData("empty keyword".to_string()));
        }

        let now = Utc::now();
        let mut mappings = self.mappings.write().map_err(poisoned)?;
        let mapping = mappings
            .entry(keyword.clone())
            .and_modify(|m| {
                m.category = category;
                m.count += 1;
                m.updated_at = now;
            })
            .or_insert_with(|| LearnedMapping {
                keyword,
                category,
                count: 1,
                created_at: now,
                updated_at: now,
            });
        Ok(mapping.clone())
    }

    async fn list(&self) -> Result<Vec<LearnedMapping>> {
        let mappings = self.mappings.read().map_err(poisoned)?;
        let mut all: Vec<LearnedMapping> = mappings.values().cloned().collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
        Ok(all)
    }

    async fn remove(&self, keyword: &str) -> Result<bool> {
        let mut mappings = self.mappings.write().map_err(poisoned)?;
        Ok(mappings.remove(&normalize_keyword(keyword)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_creates_then_increments() {
        let store = InMemoryMappingStore::new();

        let first = store.upsert("Bakso", Category::Food).await.unwrap();
        assert_eq!(first.keyword, "bakso");
        assert_eq!(first.count, 1);

        let second = store.upsert("bakso", Category::Entertainment).await.unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.category, Category::Entertainment);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_is_case_insensitive() {
        let store = InMemoryMappingStore::with_mappings([("warkop", Category::Food)]);
        let found = store.get("  WARKOP ").await.unwrap().unwrap();
        assert_eq!(found.category, Category::Food);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_keyword() {
        let store = InMemoryMappingStore::new();
        assert!(store.upsert("   ", Category::Food).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_count() {
        let store = InMemoryMappingStore::new();
        store.upsert("kopi", Category::Food).await.unwrap();
        store.upsert("ojek", Category::Transport).await.unwrap();
        store.upsert("ojek", Category::Transport).await.unwrap();

        let all = store.list().await.unwrap();
        let keywords: Vec<&str> = all.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["ojek", "kopi"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryMappingStore::with_mappings([("kopi", Category::Food)]);
        assert!(store.remove("KOPI").await.unwrap());
        assert!(!store.remove("kopi").await.unwrap());
        assert!(store.is_empty());
    }
}
