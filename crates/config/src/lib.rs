//! Configuration management for Praktor
//!
//! Loads the optional config file and resolves which provider endpoint,
//! credential and wire format a run talks to.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod paths;
pub mod resolve;

pub use paths::{config_path, data_dir};
pub use resolve::{ProviderConfig, WireFormat};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no credentials: set OPENROUTER_API_KEY or ANTHROPIC_API_KEY")]
    NoCredentials,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Credentials for one provider as written in the config file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

/// All supported providers
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openrouter: ProviderCredentials,
    #[serde(default)]
    pub anthropic: ProviderCredentials,
}

/// Agent defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub workspace: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            openrouter_model: default_openrouter_model(),
            anthropic_model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
            workspace: None,
        }
    }
}

fn default_openrouter_model() -> String {
    "anthropic/claude-sonnet-4.5".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

/// Root configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("Loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Root directory tool paths resolve against
    pub fn workspace_path(&self) -> PathBuf {
        match &self.agent.workspace {
            Some(path) if !path.trim().is_empty() => paths::expand_tilde(path),
            _ => PathBuf::from("."),
        }
    }

    /// Maximum completion tokens per inference call
    pub fn max_tokens(&self) -> u32 {
        self.agent.max_tokens
    }
}
