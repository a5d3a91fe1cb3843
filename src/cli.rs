//! Command-line interface definition for Astrai
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat and the daily content feed.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Astrai - conversational neural core and daily signal feed
#[derive(Parser, Debug, Clone)]
#[command(name = "astrai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Display language (en, zh-TW)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    /// Override the content store directory
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Astrai
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive conversation
    Chat,

    /// Show today's generated posts
    Daily,

    /// Show today's deep insight
    Insight,

    /// Read a post, expanding it into a full article when needed
    Read {
        /// Post identifier, e.g. SIGNAL_20260201_01
        post_id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            locale: None,
            storage_path: None,
            command: Commands::Chat,
        }
    }
}
