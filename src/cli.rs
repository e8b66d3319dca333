//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap. Credentials are
//! usually supplied through the environment, which clap reads for us.

use clap::Parser;
use std::path::PathBuf;

/// Mindscape - assessment submission service
///
/// Accepts assessment submissions over HTTP, analyzes the free-text answers
/// with a language model (or a built-in fallback) and records every result
/// to a local JSON-lines log and, when configured, a Supabase table.
///
/// Examples:
///   mindscape
///   mindscape --port 8080 --results-log /var/lib/mindscape/results.json
///   OPENAI_API_KEY=sk-... SUPABASE_URL=https://x.supabase.co SUPABASE_ANON_KEY=... mindscape
///   mindscape --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .mindscape.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "ADDR", env = "MINDSCAPE_HOST")]
    pub host: Option<String>,

    /// Port to bind the HTTP server to
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Append-only JSON-lines file receiving every result
    #[arg(long, value_name = "FILE", env = "MINDSCAPE_RESULTS_LOG")]
    pub results_log: Option<PathBuf>,

    /// Language model used for analysis
    #[arg(short, long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// API key for the language model
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Supabase project URL
    #[arg(long, value_name = "URL", env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Discord bot token for image notifications
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_bot_token: Option<String>,

    /// Discord channel for image notifications
    #[arg(long, env = "DISCORD_CHANNEL_ID")]
    pub discord_channel_id: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .mindscape.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if let Some(ref url) = self.supabase_url {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Supabase URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
