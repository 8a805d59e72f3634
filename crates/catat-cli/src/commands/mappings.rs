//! Learned mapping commands

use anyhow::Result;
use catat_core::Database;

pub fn cmd_mappings_list(db: &Database, json: bool) -> Result<()> {
    let mappings = db.list_learned_mappings()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&mappings)?);
        return Ok(());
    }

    if mappings.is_empty() {
        println!("No learned mappings yet. Teach one with 'catat learn <keyword> <category>'.");
        return Ok(());
    }

    println!();
    println!("🧠 Learned mappings");
    println!("   ─────────────────────────────────────────────");
    for mapping in &mappings {
        println!(
            "   {:<20} {:<14} {:>4}x  {}",
            mapping.keyword,
            mapping.category.as_str(),
            mapping.count,
            mapping.updated_at.format("%Y-%m-%d")
        );
    }
    println!();
    println!("   {} mapping(s)", mappings.len());

    Ok(())
}

pub fn cmd_forget(db: &Database, keyword: &str) -> Result<()> {
    if db.delete_learned_mapping(keyword)? {
        println!("✅ Forgot '{}'", keyword.trim().to_lowercase());
    } else {
        println!("No learned mapping for '{}'", keyword);
    }
    Ok(())
}
