//! Anthropic Messages format
//!
//! The protocol has no tool role: tool results travel as user messages made
//! of a `tool_result` block, and tool calls as `tool_use` blocks on the
//! assistant message. Arguments are parsed into `input` on the way out and
//! serialized back on the way in.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::{ApiErrorBody, WireAdapter};
use crate::{ChatParams, ChatResponse, Message, ProviderError, Result, Role, ToolCall, ToolSpec};

pub struct AnthropicWire;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: WireContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Blocks(Vec<ContentBlock<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: Value,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
    },
}

#[derive(Serialize)]
struct WireTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Option<Vec<ResponseBlock>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Stored arguments back to a JSON value. Empty means no arguments.
fn parse_input(arguments: &str) -> Result<Value> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(arguments).map_err(ProviderError::Encode)
}

fn wire_message(message: &Message) -> Result<WireMessage<'_>> {
    match message.role {
        Role::Tool => Ok(WireMessage {
            role: "user",
            content: WireContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: message.tool_call_id.as_deref().unwrap_or_default(),
                content: &message.content,
            }]),
        }),
        Role::Assistant if message.has_tool_calls() => {
            let mut blocks = Vec::with_capacity(message.tool_calls.len() + 1);
            // The API rejects empty text blocks
            if !message.content.is_empty() {
                blocks.push(ContentBlock::Text {
                    text: &message.content,
                });
            }
            for call in &message.tool_calls {
                blocks.push(ContentBlock::ToolUse {
                    id: &call.id,
                    name: &call.name,
                    input: parse_input(&call.arguments)?,
                });
            }
            Ok(WireMessage {
                role: "assistant",
                content: WireContent::Blocks(blocks),
            })
        }
        role => Ok(WireMessage {
            role: role.as_str(),
            content: WireContent::Text(&message.content),
        }),
    }
}

fn wire_tool(tool: &ToolSpec) -> WireTool<'_> {
    WireTool {
        name: &tool.name,
        description: &tool.description,
        input_schema: &tool.input_schema,
    }
}

impl WireAdapter for AnthropicWire {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("x-api-key", api_key.to_string())]
    }

    fn build_request(&self, params: &ChatParams) -> Result<Value> {
        let messages = params
            .messages
            .iter()
            .map(wire_message)
            .collect::<Result<Vec<_>>>()?;

        let request = MessagesRequest {
            model: &params.model,
            messages,
            tools: params.tools.iter().map(wire_tool).collect(),
            max_tokens: params.max_tokens,
        };
        serde_json::to_value(&request).map_err(ProviderError::Encode)
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatResponse> {
        let response: MessagesResponse =
            serde_json::from_slice(body).map_err(ProviderError::Decode)?;

        if let Some(error) = response.error {
            return Err(ProviderError::Api(error.describe()));
        }

        let blocks = response
            .content
            .filter(|blocks| !blocks.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in blocks {
            match block {
                ResponseBlock::Text { text: chunk } => text.push_str(&chunk),
                ResponseBlock::ToolUse { id, name, input } => {
                    let input = if input.is_null() {
                        Value::Object(Default::default())
                    } else {
                        input
                    };
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments: input.to_string(),
                    });
                }
                ResponseBlock::Other => {}
            }
        }

        trace!("anthropic response: {} tool calls", tool_calls.len());

        Ok(ChatResponse { text, tool_calls })
    }
}
