//! HTTP inference client

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, trace};

use crate::wire::{adapter_for, WireAdapter};
use crate::{ChatParams, ChatResponse, Provider, ProviderConfig, ProviderError, Result};

/// Provider reached over HTTP with the wire format picked at construction
pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
    wire: Box<dyn WireAdapter>,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let wire = adapter_for(config.wire_format);
        Self::with_adapter(config, wire)
    }

    pub fn with_adapter(config: ProviderConfig, wire: Box<dyn WireAdapter>) -> Self {
        Self {
            client: Client::new(),
            config,
            wire,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn wire_name(&self) -> &'static str {
        self.wire.name()
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn chat(&self, mut params: ChatParams) -> Result<ChatResponse> {
        if params.model.is_empty() {
            params.model = self.config.model.clone();
        }

        let body = self.wire.build_request(&params)?;
        let payload = serde_json::to_vec(&body).map_err(ProviderError::Encode)?;

        trace!(
            "POST {} ({}, {} messages)",
            self.config.endpoint,
            self.wire.name(),
            params.messages.len()
        );

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in self.wire.auth_headers(&self.config.api_key) {
            request = request.header(name, value);
        }
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.body(payload).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            debug!("Provider returned HTTP {}", status);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed = self.wire.parse_response(&bytes)?;
        debug!(
            "Inference complete: {} chars, {} tool calls",
            parsed.text.len(),
            parsed.tool_calls.len()
        );
        Ok(parsed)
    }

    fn default_model(&self) -> String {
        self.config.model.clone()
    }
}
