//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `entry` - Parse and categorize entries, teach and correct keywords
//! - `mappings` - Learned mapping listing and removal
//! - `ai` - AI backend diagnostics

pub mod ai;
pub mod entry;
pub mod mappings;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use catat_core::{AiConfig, Categorizer, Database, RemoteClassifier};

// Re-export command functions for main.rs
pub use ai::*;
pub use entry::*;
pub use mappings::*;

/// Open (or create) the database, creating its directory if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Categorizer over the database, with the AI backend when `use_remote`
pub fn open_categorizer(db_path: &Path, use_remote: bool) -> Result<Categorizer> {
    let db = Arc::new(open_db(db_path)?);
    if !use_remote {
        return Ok(Categorizer::local_only(db));
    }

    let config = AiConfig::load().context("Failed to load AI config")?;
    let remote =
        RemoteClassifier::from_config(&config, db.clone()).context("Failed to set up AI backend")?;
    Ok(Categorizer::new(db, remote))
}

/// Rupiah with dot thousand separators: 1500000 → "Rp 1.500.000"
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}Rp {}", sign, grouped)
}
