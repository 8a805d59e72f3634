//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use catat_core::Category;
use clap::{Parser, Subcommand};

/// Catat - Quick Indonesian expense entry
#[derive(Parser)]
#[command(name = "catat")]
#[command(about = "Turn \"bakso 15rb\" into an amount and a spending category", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split an entry into description and amount, then categorize it
    Parse {
        /// Entry text, e.g. "bakso 15rb"
        #[arg(required = true)]
        text: Vec<String>,

        /// Local categorization only, never call the AI backend
        #[arg(long)]
        no_ai: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Categorize a description
    Categorize {
        /// Description, e.g. "makan siang"
        #[arg(required = true)]
        description: Vec<String>,

        /// Local categorization only, never call the AI backend
        #[arg(long)]
        no_ai: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Teach a keyword→category mapping
    Learn {
        /// Single word, e.g. "warkop"
        keyword: String,

        /// food, transport, bills, shopping, entertainment or income
        category: Category,
    },

    /// Correct the category of a description
    ///
    /// Learns the description's first word (skipping leading numbers).
    Correct {
        /// Description to correct
        #[arg(required = true)]
        description: Vec<String>,

        /// Correct category
        #[arg(long = "as", value_name = "CATEGORY")]
        category: Category,
    },

    /// List learned mappings
    Mappings {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a learned mapping
    Forget {
        /// Keyword to forget
        keyword: String,
    },

    /// AI backend commands
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Show the resolved AI config, check connectivity, run one classification
    Test {
        /// Description to classify (nothing is learned)
        description: Option<String>,
    },
}

impl Cli {
    /// Database path from `--db`, else the platform default, else ./catat.db
    pub fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .or_else(catat_core::Database::default_path)
            .unwrap_or_else(|| PathBuf::from(catat_core::db::DB_FILE_NAME))
    }
}
