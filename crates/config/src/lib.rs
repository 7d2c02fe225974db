//! Configuration loading, validation, and management for Cascata.
//!
//! Loads configuration from `~/.cascata/config.toml` with environment
//! variable overrides for API keys. The ordered provider chain, per-provider
//! timeouts, and the memory TTL are all static configuration, loaded once at
//! process start; there is no runtime reconfiguration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cascata/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenRouter API key (env: `OPENROUTER_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,

    /// Hugging Face API key (env: `HUGGINGFACE_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huggingface_api_key: Option<String>,

    /// Ephemeral memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// The ordered fallback chain. Position in this list is the only
    /// priority signal the orchestrator uses.
    #[serde(default = "default_chain")]
    pub chain: Vec<ChainEntryConfig>,

    /// Specialized image backends
    #[serde(default)]
    pub images: ImagesConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("huggingface_api_key", &redact(&self.huggingface_api_key))
            .field("memory", &self.memory)
            .field("chain", &self.chain)
            .field("images", &self.images)
            .finish()
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// Ephemeral memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Sliding window TTL in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Log a warning when a single user's window exceeds this many entries.
    /// There is deliberately no hard cap; the TTL is the only bound.
    #[serde(default = "default_warn_window_len")]
    pub warn_window_len: usize,
}

fn default_ttl_ms() -> u64 {
    60_000
}
fn default_warn_window_len() -> usize {
    500
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            warn_window_len: default_warn_window_len(),
        }
    }
}

/// One position in the fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntryConfig {
    /// Backend kind: "openrouter", "huggingface", or "ollama"
    pub name: String,

    /// Model to request, where the backend takes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Endpoint override (defaults per backend kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_attempt_timeout_secs() -> u64 {
    5
}

/// The default chain mirrors the original deployment: the hosted router
/// first, the free inference endpoint second, then local models in cost
/// order. Cheap and fast backends go first on purpose.
fn default_chain() -> Vec<ChainEntryConfig> {
    let mut chain = vec![
        ChainEntryConfig {
            name: "openrouter".into(),
            model: Some("mistralai/mixtral-8x7b-instruct".into()),
            api_url: None,
            timeout_secs: 10,
        },
        ChainEntryConfig {
            name: "huggingface".into(),
            model: None,
            api_url: None,
            timeout_secs: 5,
        },
    ];
    for model in ["llama3", "mistral", "gemma", "dolphin-mistral", "codellama"] {
        chain.push(ChainEntryConfig {
            name: "ollama".into(),
            model: Some(model.into()),
            api_url: None,
            timeout_secs: 5,
        });
    }
    chain
}

/// Specialized image backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Image-generation endpoint
    #[serde(default = "default_generation_url")]
    pub generation_url: String,

    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Image-captioning endpoint
    #[serde(default = "default_caption_url")]
    pub caption_url: String,

    #[serde(default = "default_caption_timeout_secs")]
    pub caption_timeout_secs: u64,

    /// Directory where generated images are written
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_generation_url() -> String {
    "https://api-inference.huggingface.co/models/runwayml/stable-diffusion-v1-5".into()
}
fn default_generation_timeout_secs() -> u64 {
    10
}
fn default_caption_url() -> String {
    "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-base".into()
}
fn default_caption_timeout_secs() -> u64 {
    5
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            generation_url: default_generation_url(),
            generation_timeout_secs: default_generation_timeout_secs(),
            caption_url: default_caption_url(),
            caption_timeout_secs: default_caption_timeout_secs(),
            output_dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cascata/config.toml).
    ///
    /// Environment variables take priority over file values for API keys:
    /// `OPENROUTER_API_KEY` and `HUGGINGFACE_API_KEY`.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            config.openrouter_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("HUGGINGFACE_API_KEY") {
            config.huggingface_api_key = Some(key);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cascata")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.ttl_ms == 0 {
            return Err(ConfigError::ValidationError(
                "memory.ttl_ms must be greater than zero".into(),
            ));
        }

        if self.chain.is_empty() {
            return Err(ConfigError::ValidationError(
                "chain must contain at least one provider".into(),
            ));
        }

        for entry in &self.chain {
            if entry.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "chain entry '{}' has a zero timeout",
                    entry.name
                )));
            }
            match entry.name.as_str() {
                "openrouter" | "huggingface" | "ollama" => {}
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "unknown chain backend kind: '{other}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            huggingface_api_key: None,
            memory: MemoryConfig::default(),
            chain: default_chain(),
            images: ImagesConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
