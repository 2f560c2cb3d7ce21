//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.waterwatch.toml` files.

use crate::render::OutputFormat;
use crate::summarize::{ClientConfig, SummarySettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".waterwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where photos and (optionally) reports are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text-generation settings.
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// View settings.
    #[serde(default)]
    pub views: ViewsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format for rendered views.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for uploaded photos.
    #[serde(default = "default_photo_dir")]
    pub photo_dir: PathBuf,

    /// JSON-lines journal. Reports are kept in memory only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            photo_dir: default_photo_dir(),
            journal: None,
        }
    }
}

fn default_photo_dir() -> PathBuf {
    PathBuf::from("uploaded_images")
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of most recent weekly buckets sent with the request.
    #[serde(default = "default_recent_weeks")]
    pub recent_weeks: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
            recent_weeks: default_recent_weeks(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout() -> u64 {
    120
}

fn default_recent_weeks() -> usize {
    12
}

/// View settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Reports per gallery grid row.
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,

    /// How many zip codes the top list shows.
    #[serde(default = "default_top_zip_count")]
    pub top_zip_count: usize,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            grid_columns: default_grid_columns(),
            top_zip_count: default_top_zip_count(),
        }
    }
}

fn default_grid_columns() -> usize {
    3
}

fn default_top_zip_count() -> usize {
    5
}

impl SummarizerConfig {
    /// Connection settings for the chat client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// Per-request settings for the summarizer.
    pub fn summary_settings(&self) -> SummarySettings {
        SummarySettings {
            recent_weeks: self.recent_weeks,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
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
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref journal) = args.journal {
            self.storage.journal = Some(journal.clone());
        }
        if let Some(ref photo_dir) = args.photo_dir {
            self.storage.photo_dir = photo_dir.clone();
        }
        if let Some(ref model) = args.model {
            self.summarizer.model = model.clone();
        }
        if let Some(timeout) = args.timeout {
            self.summarizer.timeout_seconds = timeout;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
