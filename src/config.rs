use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_MAX_STRIKES;
use crate::paths::DEFAULT_MAX_PATHS;
use crate::providers::completion::{DEFAULT_COMPLETION_ENDPOINT, DEFAULT_COMPLETION_MODEL};
use crate::providers::search::DEFAULT_SEARCH_ENDPOINT;

/// Main configuration structure
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kgqa: KgqaConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub descriptions: DescriptionsConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct KgqaConfig {
    /// Graph document (Hetionet JSON layout)
    #[serde(default = "default_graph_path")]
    pub graph_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for KgqaConfig {
    fn default() -> Self {
        Self {
            graph_path: default_graph_path(),
            log_level: default_log_level(),
        }
    }
}

/// Retrieval and path discovery
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_paths: default_max_paths(),
        }
    }
}

/// Tokenizer used for pacing estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// tiktoken cl100k_base
    Cl100k,
    /// ~4 characters per token
    Approximate,
}

/// Completion provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_tokens_per_minute")]
    pub tokens_per_minute: u64,
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
    #[serde(default = "default_completion_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_tokenizer")]
    pub tokenizer: TokenizerKind,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_completion_endpoint(),
            model: default_completion_model(),
            api_key_env: default_api_key_env(),
            tokens_per_minute: default_tokens_per_minute(),
            safety_margin: default_safety_margin(),
            backoff_secs: default_completion_backoff_secs(),
            timeout_secs: default_completion_timeout_secs(),
            tokenizer: default_tokenizer(),
        }
    }
}

impl CompletionConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable with your completion API key.",
                self.api_key_env
            )
        })
    }
}

/// Web search settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_web_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            backoff_secs: default_web_backoff_secs(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

/// Page fetch settings
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_web_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_page_cache_capacity")]
    pub page_cache_capacity: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            backoff_secs: default_web_backoff_secs(),
            page_cache_capacity: default_page_cache_capacity(),
        }
    }
}

/// Consecutive-failure guard
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    #[serde(default = "default_max_strikes")]
    pub max_strikes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_strikes: default_max_strikes(),
        }
    }
}

/// Tables written by the offline description jobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptionsConfig {
    /// `identifier, kind, name, description, url`
    #[serde(default)]
    pub seeded_csv: Option<PathBuf>,
    /// `identifier, kind, name, refined_description, url`
    #[serde(default)]
    pub refined_csv: Option<PathBuf>,
}

/// Answer synthesis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesisConfig {
    /// Append the refined node descriptions to the final prompt
    #[serde(default)]
    pub include_descriptions: bool,
}

fn default_graph_path() -> PathBuf {
    PathBuf::from("hetionet-v1.0.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_paths() -> usize {
    DEFAULT_MAX_PATHS
}

fn default_completion_endpoint() -> String {
    DEFAULT_COMPLETION_ENDPOINT.to_string()
}

fn default_completion_model() -> String {
    DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_tokens_per_minute() -> u64 {
    500_000
}

fn default_safety_margin() -> f64 {
    0.9
}

fn default_completion_backoff_secs() -> u64 {
    60
}

fn default_completion_timeout_secs() -> u64 {
    120
}

fn default_tokenizer() -> TokenizerKind {
    TokenizerKind::Cl100k
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_web_backoff_secs() -> u64 {
    2
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_page_cache_capacity() -> usize {
    256
}

fn default_max_strikes() -> u32 {
    DEFAULT_MAX_STRIKES
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in KGQA_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KGQA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.max_paths == 0 {
            anyhow::bail!("retrieval.max_paths must be greater than 0");
        }

        if self.completion.tokens_per_minute == 0 {
            anyhow::bail!("completion.tokens_per_minute must be greater than 0");
        }

        if !(self.completion.safety_margin > 0.0 && self.completion.safety_margin <= 1.0) {
            anyhow::bail!("completion.safety_margin must be in (0.0, 1.0]");
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be greater than 0");
        }

        if self.completion.endpoint.trim().is_empty() || self.search.endpoint.trim().is_empty() {
            anyhow::bail!("completion.endpoint and search.endpoint must not be empty");
        }

        Ok(())
    }

    /// Get the graph document path
    pub fn graph_path(&self) -> &Path {
        &self.kgqa.graph_path
    }
}
