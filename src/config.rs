//! Configuration loading and management for booksum.
//!
//! Loads settings from `booksum.toml` when present, falling back to built-in
//! defaults, with environment variable overrides for keys and model selection.

use crate::prompt::DEFAULT_PERSONA;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "booksum.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
    #[error("unsupported provider: {0}")]
    UnknownProvider(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider: "gemini" or "openai"
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,
    /// System persona for the agent
    pub persona: String,
    /// Sampling temperature, used by providers that accept one
    pub temperature: f32,
    /// Upper bound for a single generation call
    pub timeout_secs: u64,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub gemini_key: Option<String>,
    pub openai_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub openai_base_url: String,
}

/// Where downloadable summaries are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub api: ApiConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from the default location, or defaults if there is none
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Override keys and model selection from the environment
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            self.api.gemini_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api.openai_key = Some(key);
        }
        if let Some(provider) = lookup("BOOKSUM_PROVIDER") {
            self.agent.provider = provider;
        }
        if let Some(model) = lookup("BOOKSUM_MODEL") {
            self.agent.model = model;
        }
    }

    /// Reject providers no generator exists for
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.agent.provider.as_str() {
            "gemini" | "openai" => Ok(()),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("booksum").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        let key = match self.agent.provider.as_str() {
            "gemini" => self.api.gemini_key.as_deref(),
            "openai" => self.api.openai_key.as_deref(),
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        key.filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.agent.provider.clone()))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            temperature: 0.4,
            timeout_secs: 120,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gemini_key: None,
            openai_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}
