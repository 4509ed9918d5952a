use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SomnusError};

/// Main configuration structure for Somnus
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Memory tier tuning (working buffer, sleep threshold, retrieval)
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Snapshot persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Language model configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".somnus").join("config.toml")),
            dirs::config_dir().map(|c| c.join("somnus").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SomnusError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| SomnusError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Memory tier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Number of recent turns kept in working memory
    #[serde(default = "default_working_turns")]
    pub working_turns: usize,
    /// Minimum salience for an episodic event to be consolidated during sleep
    #[serde(default = "default_sleep_threshold")]
    pub sleep_threshold: f32,
    /// Maximum facts surfaced per reply (unbounded when absent)
    #[serde(default)]
    pub max_facts: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            working_turns: default_working_turns(),
            sleep_threshold: default_sleep_threshold(),
            max_facts: None,
        }
    }
}

fn default_working_turns() -> usize {
    8
}

fn default_sleep_threshold() -> f32 {
    0.5
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Location of the JSON snapshot file
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".somnus"))
        .unwrap_or_else(|| PathBuf::from(".somnus"))
        .join("memory.json")
}

/// Language model (OpenAI-compatible chat completions) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API base URL, `/chat/completions` is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the API key (optional for local servers)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in a generated reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_api_key_env() -> String {
    "SOMNUS_API_KEY".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

/// Embedding service (OpenAI-compatible `/embeddings`) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// API base URL, `/embeddings` is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the API key (optional for local servers)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Embedding model identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of cached embeddings held by the semantic store
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            model: default_embedding_model(),
            timeout_secs: default_embedding_timeout_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    1024
}

/// Web search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Consult web search when a query looks like it needs fresh facts
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,
    /// DuckDuckGo instant answer endpoint
    #[serde(default = "default_search_api_url")]
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum results folded into a prompt
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_enabled(),
            api_url: default_search_api_url(),
            timeout_secs: default_search_timeout_secs(),
            max_results: default_search_max_results(),
        }
    }
}

fn default_search_enabled() -> bool {
    true
}

fn default_search_api_url() -> String {
    "https://api.duckduckgo.com".to_string()
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_search_max_results() -> usize {
    3
}
