//! Configuration file handling.
//!
//! This module handles loading `.mindscape.toml` and merging it with
//! command-line flags and environment variables. Every credential is
//! optional; a missing one only disables the feature that needs it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".mindscape.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote analysis (language model) settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Local log and remote record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Image notification settings.
    #[serde(default)]
    pub image: ImageConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_service_name() -> String {
    "Mindscape Diagnosis Enterprise".to_string()
}

/// Language-model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// API key for the chat-completions endpoint.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_analysis_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_analysis_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_analysis_timeout() -> u64 {
    60
}

impl AnalysisConfig {
    /// Remote analysis is used only with a well-formed secret key.
    pub fn is_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| key.starts_with("sk-"))
    }

    /// Key prefix safe to print in logs.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(|key| format!("{}...", key.chars().take(8).collect::<String>()))
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Append-only JSON-lines backup file.
    #[serde(default = "default_results_log")]
    pub results_log: PathBuf,

    /// Base URL of the record store (PostgREST / Supabase project URL).
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Record store API key.
    #[serde(default)]
    pub supabase_key: Option<String>,

    /// Table receiving assessment records.
    #[serde(default = "default_table")]
    pub table: String,

    /// Value written to the `origin` column.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Request timeout in seconds.
    #[serde(default = "default_storage_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            results_log: default_results_log(),
            supabase_url: None,
            supabase_key: None,
            table: default_table(),
            origin: default_origin(),
            timeout_seconds: default_storage_timeout(),
        }
    }
}

fn default_results_log() -> PathBuf {
    PathBuf::from("results.json")
}

fn default_table() -> String {
    "diagnostic_results".to_string()
}

fn default_origin() -> String {
    "mindscape".to_string()
}

fn default_storage_timeout() -> u64 {
    30
}

impl StorageConfig {
    /// The record store is used only when both URL and key are present.
    pub fn is_enabled(&self) -> bool {
        let url_ok = self
            .supabase_url
            .as_deref()
            .is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"));
        let key_ok = self.supabase_key.as_deref().is_some_and(|key| !key.is_empty());
        url_ok && key_ok
    }
}

/// Image notification settings (Discord bot relaying to an image generator).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub discord_bot_token: Option<String>,

    #[serde(default)]
    pub discord_channel_id: Option<String>,
}

impl ImageConfig {
    pub fn is_enabled(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.discord_bot_token) && set(&self.discord_channel_id)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Flags and environment variables take precedence over the file, but
    /// only when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref key) = args.openai_api_key {
            self.analysis.api_key = Some(key.clone());
        }
        if let Some(ref model) = args.model {
            self.analysis.model = model.clone();
        }

        if let Some(ref path) = args.results_log {
            self.storage.results_log = path.clone();
        }
        if let Some(ref url) = args.supabase_url {
            self.storage.supabase_url = Some(url.clone());
        }
        if let Some(ref key) = args.supabase_key {
            self.storage.supabase_key = Some(key.clone());
        }

        if let Some(ref token) = args.discord_bot_token {
            self.image.discord_bot_token = Some(token.clone());
        }
        if let Some(ref channel) = args.discord_channel_id {
            self.image.discord_channel_id = Some(channel.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
