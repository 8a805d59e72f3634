//! Data models for Catat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spending category assigned to a transaction
///
/// A flat label set; `Other` is the fallback and never counts as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Bills,
    Shopping,
    Entertainment,
    Income,
    Other,
}

impl Category {
    /// All categories in canonical order.
    ///
    /// Reply parsing walks this order, so an earlier entry wins when an AI
    /// reply mentions two category names.
    pub const ALL: [Category; 7] = [
        Self::Food,
        Self::Transport,
        Self::Bills,
        Self::Shopping,
        Self::Entertainment,
        Self::Income,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Bills => "bills",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Income => "income",
            Self::Other => "other",
        }
    }

    /// True for every category except the `Other` fallback
    pub fn is_match(&self) -> bool {
        *self != Self::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "bills" => Ok(Self::Bills),
            "shopping" => Ok(Self::Shopping),
            "entertainment" => Ok(Self::Entertainment),
            "income" => Ok(Self::Income),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A free-text entry split into its description and amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInput {
    /// Trimmed, punctuation-stripped remainder of the entry
    pub description: String,
    /// Amount in whole rupiah, always > 0
    pub amount: i64,
}

/// A keyword→category association learned from AI results or user corrections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedMapping {
    /// Lowercase single word, unique
    pub keyword: String,
    pub category: Category,
    /// Times this keyword has been reinforced, starts at 1
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which tier produced a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Learned mapping from the store
    Learned,
    /// Exact hit in the built-in keyword table
    Exact,
    /// Substring containment against the keyword table
    Substring,
    /// Approximate (edit distance) match against the keyword table
    Fuzzy,
    /// Remote AI classification
    Remote,
    /// Nothing matched, collapsed to `other`
    Fallback,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of categorizing a description, with provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub category: Category,
    pub source: MatchSource,
    /// Keyword that produced the match (table entry or learned keyword)
    pub keyword: Option<String>,
    /// Similarity score, only set for fuzzy matches
    pub similarity: Option<f64>,
}

impl CategoryMatch {
    pub(crate) fn new(category: Category, source: MatchSource, keyword: &str) -> Self {
        Self {
            category,
            source,
            keyword: Some(keyword.to_string()),
            similarity: None,
        }
    }

    pub(crate) fn without_keyword(category: Category, source: MatchSource) -> Self {
        Self {
            category,
            source,
            keyword: None,
            similarity: None,
        }
    }
}
