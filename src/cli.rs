//! Command-line interface for earshot
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Cached build version string, held `'static` so clap can borrow it as `&str`.
static VERSION: LazyLock<String> = LazyLock::new(crate::version_string);

/// Streaming audio-feature classification
#[derive(Parser, Debug)]
#[command(
    name = "earshot",
    version = VERSION.as_str(),
    about = "Streaming audio-feature classification for Teachable Machine models"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the feed and print frame metadata without classifying (default)
    Tap {
        /// Override the extractor command from the config
        #[arg(long, value_name = "CMD")]
        command: Option<String>,

        /// Arguments for the overridden extractor command
        #[arg(long, value_name = "ARG", requires = "command")]
        arg: Vec<String>,
    },

    /// Fetch model documents and validate them against the frame configuration
    CheckModel {
        /// Model base URL (defaults to model.url from the config)
        #[arg(value_name = "URL")]
        url: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init,
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
}
