//! Entry parsing and categorization commands

use anyhow::{Context, Result};
use catat_core::{split::try_split_input, Category, CategoryMatch, Categorizer, MatchSource};
use serde::Serialize;

use super::format_rupiah;

#[derive(Serialize)]
struct ParsedEntry<'a> {
    description: &'a str,
    amount: i64,
    #[serde(flatten)]
    matched: &'a CategoryMatch,
}

/// How a category was found, for display: "exact: bakso", "fuzzy: bakso 80%"
pub fn describe_match(matched: &CategoryMatch) -> String {
    match (matched.source, matched.keyword.as_deref(), matched.similarity) {
        (MatchSource::Fuzzy, Some(keyword), Some(similarity)) => {
            format!("fuzzy: {} {:.0}%", keyword, similarity * 100.0)
        }
        (source, Some(keyword), _) => format!("{}: {}", source, keyword),
        (source, None, _) => source.to_string(),
    }
}

pub async fn cmd_parse(
    categorizer: &Categorizer,
    text: &str,
    use_remote: bool,
    json: bool,
) -> Result<()> {
    let entry =
        try_split_input(text).with_context(|| format!("Could not parse entry '{}'", text))?;

    let matched = categorizer
        .categorize_with_fallback_detailed(&entry.description, use_remote)
        .await;

    if json {
        let output = ParsedEntry {
            description: &entry.description,
            amount: entry.amount,
            matched: &matched,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("📝 {}", entry.description);
    println!("   Amount:   {}", format_rupiah(entry.amount));
    println!(
        "   Category: {} ({})",
        matched.category,
        describe_match(&matched)
    );

    Ok(())
}

pub async fn cmd_categorize(
    categorizer: &Categorizer,
    description: &str,
    use_remote: bool,
    json: bool,
) -> Result<()> {
    let matched = categorizer
        .categorize_with_fallback_detailed(description, use_remote)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&matched)?);
    } else {
        println!("{} ({})", matched.category, describe_match(&matched));
    }

    Ok(())
}

pub async fn cmd_learn(categorizer: &Categorizer, keyword: &str, category: Category) -> Result<()> {
    let mapping = categorizer
        .learn(keyword, category)
        .await
        .with_context(|| format!("Failed to learn '{}'", keyword))?;

    println!(
        "✅ Learned '{}' → {} (seen {}x)",
        mapping.keyword, mapping.category, mapping.count
    );
    Ok(())
}

pub async fn cmd_correct(
    categorizer: &Categorizer,
    description: &str,
    category: Category,
) -> Result<()> {
    let mapping = categorizer
        .correct(description, category)
        .await
        .with_context(|| format!("Failed to correct '{}'", description))?;

    println!(
        "✅ '{}' is now {} (learned keyword '{}')",
        description, mapping.category, mapping.keyword
    );
    Ok(())
}
