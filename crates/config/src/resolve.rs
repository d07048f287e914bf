//! Provider resolution
//!
//! Picks the provider a run talks to. OpenRouter credentials win over
//! Anthropic ones; with neither present resolution fails. The environment
//! is consulted before the config file.

use tracing::debug;

use crate::{Config, ConfigError, Result};

pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";

const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_MESSAGES_SUFFIX: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request/response shape spoken by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    OpenAi,
    Anthropic,
}

/// Everything needed to reach the selected provider. Fixed for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub headers: Vec<(String, String)>,
    pub wire_format: WireFormat,
}

impl ProviderConfig {
    /// OpenRouter (OpenAI-compatible) endpoint
    pub fn openrouter(
        api_key: impl Into<String>,
        api_base: Option<&str>,
        model: impl Into<String>,
    ) -> Self {
        let base = api_base.unwrap_or(OPENROUTER_BASE).trim_end_matches('/');
        Self {
            endpoint: format!("{}/chat/completions", base),
            api_key: api_key.into(),
            model: model.into(),
            headers: vec![
                ("HTTP-Referer".to_string(), "https://praktor.ai".to_string()),
                ("X-Title".to_string(), "Praktor".to_string()),
            ],
            wire_format: WireFormat::OpenAi,
        }
    }

    /// Anthropic Messages endpoint, optionally behind a custom base URL
    pub fn anthropic(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        model: impl Into<String>,
    ) -> Self {
        let endpoint = base_url
            .map(normalize_anthropic_endpoint)
            .unwrap_or_else(|| ANTHROPIC_ENDPOINT.to_string());
        Self {
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
            headers: vec![(
                "anthropic-version".to_string(),
                ANTHROPIC_VERSION.to_string(),
            )],
            wire_format: WireFormat::Anthropic,
        }
    }
}

/// Make a base URL end with the Anthropic messages path
pub fn normalize_anthropic_endpoint(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with(ANTHROPIC_MESSAGES_SUFFIX) {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{}/messages", base)
    } else {
        format!("{}{}", base, ANTHROPIC_MESSAGES_SUFFIX)
    }
}

/// Trimmed value, or `None` when absent or whitespace-only
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Resolve the provider using `env` for environment lookups
    pub fn resolve_provider<F>(&self, env: F) -> Result<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openrouter = &self.providers.openrouter;
        if let Some(key) = non_blank(env(OPENROUTER_API_KEY))
            .or_else(|| non_blank(Some(openrouter.api_key.clone())))
        {
            let base = non_blank(openrouter.api_base.clone());
            debug!("Resolved OpenRouter provider (custom base: {})", base.is_some());
            return Ok(ProviderConfig::openrouter(
                key,
                base.as_deref(),
                &self.agent.openrouter_model,
            ));
        }

        let anthropic = &self.providers.anthropic;
        if let Some(key) = non_blank(env(ANTHROPIC_API_KEY))
            .or_else(|| non_blank(Some(anthropic.api_key.clone())))
        {
            let base = non_blank(env(ANTHROPIC_BASE_URL))
                .or_else(|| non_blank(anthropic.api_base.clone()));
            debug!("Resolved Anthropic provider (custom base: {})", base.is_some());
            return Ok(ProviderConfig::anthropic(
                key,
                base.as_deref(),
                &self.agent.anthropic_model,
            ));
        }

        Err(ConfigError::NoCredentials)
    }

    /// Resolve the provider from the process environment
    pub fn resolve_provider_from_env(&self) -> Result<ProviderConfig> {
        self.resolve_provider(|name| std::env::var(name).ok())
    }
}
