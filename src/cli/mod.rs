//! CLI module for Vett.

pub mod commands;
pub mod delivery;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vett - audience-aware answers from a self-learning knowledge cache
///
/// Answers questions from what it has already learned, searches the web when
/// it has to, and remembers what it finds. The name "Vett" is Norwegian for
/// "wit, common sense."
#[derive(Parser, Debug)]
#[command(name = "vett")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VETT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question
    Ask {
        /// The question to ask
        query: String,

        /// Audience: child, teen, adult or senior
        #[arg(short, long, default_value = "adult")]
        tier: String,

        /// Also translate the summary (language name or code)
        #[arg(long)]
        translate_to: Option<String>,

        /// Save a spoken version of the summary
        #[arg(long)]
        speak: bool,

        /// Save the summary to a text file
        #[arg(long)]
        download: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Exit without waiting for the background video summary
        #[arg(long)]
        no_wait: bool,
    },

    /// Summarize a document, image or video (file path or URL)
    Summarize {
        /// File path or video URL
        input: String,

        /// Audience: child, teen, adult or senior
        #[arg(short, long, default_value = "adult")]
        tier: String,

        /// Save the summary to a text file
        #[arg(long)]
        download: bool,
    },

    /// List what has been learned so far
    List,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List languages available for translation
    Languages,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
