//! Wire formats
//!
//! Each adapter turns [`ChatParams`] into a provider request body and a raw
//! provider response back into a [`ChatResponse`]. The adapter is chosen once
//! from the resolved [`WireFormat`]; nothing downstream inspects the tag.

use serde::Deserialize;
use serde_json::Value;

use crate::{ChatParams, ChatResponse, Result, WireFormat};

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicWire;
pub use openai::OpenAiWire;

pub trait WireAdapter: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Credential headers for this protocol
    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)>;

    fn build_request(&self, params: &ChatParams) -> Result<Value>;

    fn parse_response(&self, body: &[u8]) -> Result<ChatResponse>;
}

pub fn adapter_for(format: WireFormat) -> Box<dyn WireAdapter> {
    match format {
        WireFormat::OpenAi => Box::new(OpenAiWire),
        WireFormat::Anthropic => Box::new(AnthropicWire),
    }
}

/// Error object a provider may embed in a response body
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn describe(&self) -> String {
        match (&self.kind, self.message.is_empty()) {
            (Some(kind), true) => kind.clone(),
            (Some(kind), false) => format!("{} ({})", self.message, kind),
            (None, _) => self.message.clone(),
        }
    }
}
