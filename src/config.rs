//! Configuration management for HealthAI
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{HealthaiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for HealthAI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Analysis history settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Input size limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// HTTP API server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Provider configuration
///
/// Specifies which completion service to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Timeout for a single completion request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for completions
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; usually supplied through `GEMINI_API_KEY` instead of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// Endpoints are built as `{api_base}/v1beta/models/{model}:generateContent`.
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Public Gemini API base used when `api_base` is not configured
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_key: None,
            api_base: None,
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of prior messages replayed into each chat prompt
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

fn default_context_turns() -> usize {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_turns: default_context_turns(),
        }
    }
}

/// Analysis history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of analyses retained; older ones are evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Optional database path; defaults to the platform data directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_max_entries() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            db_path: None,
        }
    }
}

/// Input size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters accepted for symptom descriptions and reports
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_max_input_chars() -> usize {
    1000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Accepted bearer tokens for the policy endpoint
    ///
    /// When empty any bearer token is accepted, only its presence is checked.
    #[serde(default)]
    pub api_tokens: Vec<String>,

    /// Timeout for fetching policy documents (seconds)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Largest policy document accepted (bytes)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_max_document_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_tokens: Vec::new(),
            fetch_timeout_seconds: default_fetch_timeout(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HealthaiError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| HealthaiError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // HEALTHAI_GEMINI_API_KEY wins over the generic GEMINI_API_KEY
        if let Ok(key) =
            std::env::var("HEALTHAI_GEMINI_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY"))
        {
            if !key.trim().is_empty() {
                self.provider.gemini.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("HEALTHAI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("HEALTHAI_API_BASE") {
            self.provider.gemini.api_base = Some(api_base);
        }

        if let Ok(timeout) = std::env::var("HEALTHAI_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.provider.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid HEALTHAI_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(max) = std::env::var("HEALTHAI_HISTORY_MAX") {
            match max.parse() {
                Ok(value) => {
                    self.history.max_entries = value;
                    tracing::debug!(max_entries = value, "Env override: HEALTHAI_HISTORY_MAX");
                }
                Err(_) => tracing::warn!("Invalid HEALTHAI_HISTORY_MAX: {}", max),
            }
        }

        if let Ok(turns) = std::env::var("HEALTHAI_CONTEXT_TURNS") {
            match turns.parse() {
                Ok(value) => self.chat.context_turns = value,
                Err(_) => tracing::warn!("Invalid HEALTHAI_CONTEXT_TURNS: {}", turns),
            }
        }

        if let Ok(bind) = std::env::var("HEALTHAI_BIND") {
            tracing::debug!(bind = %bind, "Env override: HEALTHAI_BIND");
            self.server.bind = bind;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(model) = &cli.model {
            self.provider.gemini.model = model.clone();
        }

        if let Some(path) = &cli.storage_path {
            self.history.db_path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any value is out of range. A missing API key is not
    /// a validation error here: `history` works offline, so the key is
    /// checked when a provider is created.
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(HealthaiError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(HealthaiError::Config("gemini.model cannot be empty".to_string()).into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(HealthaiError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.max_entries == 0 || self.history.max_entries > 1000 {
            return Err(HealthaiError::Config(
                "history.max_entries must be between 1 and 1000".to_string(),
            )
            .into());
        }

        if self.chat.context_turns == 0 {
            return Err(HealthaiError::Config(
                "chat.context_turns must be greater than 0".to_string(),
            )
            .into());
        }

        if self.limits.max_input_chars == 0 {
            return Err(HealthaiError::Config(
                "limits.max_input_chars must be greater than 0".to_string(),
            )
            .into());
        }

        if self.server.max_document_bytes == 0 {
            return Err(HealthaiError::Config(
                "server.max_document_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
