//! Learned mapping operations

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, LearnedMapping};
use crate::store::{normalize_keyword, MappingStore};

impl Database {
    fn row_to_mapping(row: &Row) -> rusqlite::Result<LearnedMapping> {
        let keyword: String = row.get(0)?;
        let category_str: String = row.get(1)?;
        let created_at_str: String = row.get(3)?;
        let updated_at_str: String = row.get(4)?;

        let category = category_str.parse().unwrap_or_else(|_| {
            warn!(keyword = %keyword, category = %category_str, "Unknown stored category");
            Category::Other
        });

        Ok(LearnedMapping {
            keyword,
            category,
            count: row.get(2)?,
            created_at: parse_datetime(&created_at_str),
            updated_at: parse_datetime(&updated_at_str),
        })
    }

    /// Get a learned mapping by keyword
    pub fn get_learned_mapping(&self, keyword: &str) -> Result<Option<LearnedMapping>> {
        let conn = self.conn()?;
        let mapping = conn
            .query_row(
                r#"
                SELECT keyword, category, count, created_at, updated_at
                FROM learned_mappings WHERE keyword = ?
                "#,
                params![normalize_keyword(keyword)],
                Self::row_to_mapping,
            )
            .optional()?;
        Ok(mapping)
    }

    /// Insert with count 1, or overwrite the category and bump the count
    pub fn upsert_learned_mapping(
        &self,
        keyword: &str,
        category: Category,
    ) -> Result<LearnedMapping> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Err(Error::InvalidData("empty keyword".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO learned_mappings (keyword, category, count)
            VALUES (?, ?, 1)
            ON CONFLICT(keyword) DO UPDATE SET
                category = excluded.category,
                count = learned_mappings.count + 1,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![keyword, category.as_str()],
        )?;
        debug!(keyword = %keyword, category = %category, "Upserted learned mapping");

        self.get_learned_mapping(&keyword)?
            .ok_or_else(|| Error::NotFound(format!("learned mapping '{}'", keyword)))
    }

    /// List all learned mappings, most reinforced first
    pub fn list_learned_mappings(&self) -> Result<Vec<LearnedMapping>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT keyword, category, count, created_at, updated_at
            FROM learned_mappings
            ORDER BY count DESC, keyword ASC
            "#,
        )?;

        let mappings = stmt
            .query_map([], Self::row_to_mapping)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(mappings)
    }

    /// Delete a learned mapping, returning whether it existed
    pub fn delete_learned_mapping(&self, keyword: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM learned_mappings WHERE keyword = ?",
            params![normalize_keyword(keyword)],
        )?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl MappingStore for Database {
    async fn get(&self, keyword: &str) -> Result<Option<LearnedMapping>> {
        self.get_learned_mapping(keyword)
    }

    async fn upsert(&self, keyword: &str, category: Category) -> Result<LearnedMapping> {
        self.upsert_learned_mapping(keyword, category)
    }

    async fn list(&self) -> Result<Vec<LearnedMapping>> {
        self.list_learned_mappings()
    }

    async fn remove(&self, keyword: &str) -> Result<bool> {
        self.delete_learned_mapping(keyword)
    }
}
