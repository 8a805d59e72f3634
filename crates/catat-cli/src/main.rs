//! Catat CLI - Quick Indonesian expense entry
//!
//! Usage:
//!   catat parse bakso 15rb          Split and categorize an entry
//!   catat categorize makan siang    Categorize a description
//!   catat learn warkop food         Teach a keyword
//!   catat ai test                   Check the AI backend

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = cli.db_path();

    match cli.command {
        Commands::Parse { text, no_ai, json } => {
            let categorizer = commands::open_categorizer(&db_path, !no_ai)?;
            commands::cmd_parse(&categorizer, &text.join(" "), !no_ai, json).await
        }
        Commands::Categorize {
            description,
            no_ai,
            json,
        } => {
            let categorizer = commands::open_categorizer(&db_path, !no_ai)?;
            commands::cmd_categorize(&categorizer, &description.join(" "), !no_ai, json).await
        }
        Commands::Learn { keyword, category } => {
            let categorizer = commands::open_categorizer(&db_path, false)?;
            commands::cmd_learn(&categorizer, &keyword, category).await
        }
        Commands::Correct {
            description,
            category,
        } => {
            let categorizer = commands::open_categorizer(&db_path, false)?;
            commands::cmd_correct(&categorizer, &description.join(" "), category).await
        }
        Commands::Mappings { json } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_mappings_list(&db, json)
        }
        Commands::Forget { keyword } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_forget(&db, &keyword)
        }
        Commands::Ai { action } => match action {
            AiAction::Test { description } => {
                let config = catat_core::AiConfig::load()?;
                commands::cmd_ai_test(&config, description.as_deref()).await
            }
        },
    }
}
