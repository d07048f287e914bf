//! OpenAI-compatible chat completions format (OpenRouter and friends)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::{ApiErrorBody, WireAdapter};
use crate::{ChatParams, ChatResponse, Message, ProviderError, Result, Role, ToolCall, ToolSpec};

pub struct OpenAiWire;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall<'a>,
}

#[derive(Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn wire_message(message: &Message) -> WireMessage<'_> {
    WireMessage {
        role: message.role,
        content: &message.content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: &call.id,
                kind: "function",
                function: WireFunctionCall {
                    name: &call.name,
                    arguments: &call.arguments,
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.as_deref(),
    }
}

fn wire_tool(tool: &ToolSpec) -> WireTool<'_> {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: &tool.name,
            description: &tool.description,
            parameters: &tool.input_schema,
        },
    }
}

/// Arguments normally arrive as a JSON string; some gateways send an object
fn normalize_arguments(arguments: Value) -> String {
    match arguments {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl WireAdapter for OpenAiWire {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", api_key))]
    }

    fn build_request(&self, params: &ChatParams) -> Result<Value> {
        let request = ChatRequest {
            model: &params.model,
            messages: params.messages.iter().map(wire_message).collect(),
            tools: params.tools.iter().map(wire_tool).collect(),
            max_tokens: params.max_tokens,
        };
        serde_json::to_value(&request).map_err(ProviderError::Encode)
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatResponse> {
        let completion: ChatCompletion =
            serde_json::from_slice(body).map_err(ProviderError::Decode)?;

        if let Some(error) = completion.error {
            return Err(ProviderError::Api(error.describe()));
        }

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: normalize_arguments(call.function.arguments),
            })
            .collect();

        trace!("openai response: {} tool calls", tool_calls.len());

        Ok(ChatResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_schema;
    use serde_json::json;

    fn params(messages: Vec<Message>) -> ChatParams {
        ChatParams {
            model: "anthropic/claude-sonnet-4.5".to_string(),
            messages,
            tools: vec![ToolSpec::new(
                "read_file",
                "Read a file",
                object_schema(vec![("path", "File path", true)]),
            )],
            max_tokens: 4096,
        }
    }

    #[test]
    fn test_build_request_shape() {
        let request = OpenAiWire
            .build_request(&params(vec![Message::user("Hello")]))
            .unwrap();

        assert_eq!(request["model"], "anthropic/claude-sonnet-4.5");
        assert_eq!(request["max_tokens"], 4096);

        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], json!({"role": "user", "content": "Hello"}));

        let tools = request["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "read_file");
        assert_eq!(tools[0]["function"]["description"], "Read a file");
        assert_eq!(tools[0]["function"]["parameters"]["type"], "object");
        assert_eq!(
            tools[0]["function"]["parameters"]["properties"]["path"]["type"],
            "string"
        );
    }

    #[test]
    fn test_build_request_without_tools_omits_field() {
        let mut p = params(vec![Message::user("Hi")]);
        p.tools.clear();
        let request = OpenAiWire.build_request(&p).unwrap();
        assert!(request.get("tools").is_none());
    }

    #[test]
    fn test_build_request_tool_round() {
        let request = OpenAiWire
            .build_request(&params(vec![
                Message::user("read a"),
                Message::assistant_with_tools(
                    "Reading",
                    vec![ToolCall::new("call_1", "read_file", r#"{"path":"a"}"#)],
                ),
                Message::tool("call_1", "contents of a"),
            ]))
            .unwrap();

        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);

        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Reading");
        assert_eq!(
            messages[1]["tool_calls"],
            json!([{
                "id": "call_1",
                "type": "function",
                "function": {"name": "read_file", "arguments": "{\"path\":\"a\"}"}
            }])
        );

        assert_eq!(
            messages[2],
            json!({"role": "tool", "content": "contents of a", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn test_auth_header() {
        assert_eq!(
            OpenAiWire.auth_headers("sk-or-1"),
            vec![("Authorization", "Bearer sk-or-1".to_string())]
        );
    }

    #[test]
    fn test_parse_text_response() {
        let body = json!({
            "id": "gen-1",
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        });
        let response = OpenAiWire
            .parse_response(body.to_string().as_bytes())
            .unwrap();
        assert_eq!(response, ChatResponse::text("Hello!"));
    }

    #[test]
    fn test_parse_tool_calls_keep_order() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "c1", "type": "function", "function": {"name": "list_files", "arguments": "{}"}},
                        {"id": "c2", "type": "function", "function": {"name": "read_file", "arguments": "{\"path\":\"x\"}"}}
                    ]
                }
            }]
        });
        let response = OpenAiWire
            .parse_response(body.to_string().as_bytes())
            .unwrap();

        assert_eq!(response.text, "");
        assert_eq!(
            response.tool_calls,
            vec![
                ToolCall::new("c1", "list_files", "{}"),
                ToolCall::new("c2", "read_file", r#"{"path":"x"}"#),
            ]
        );
    }

    #[test]
    fn test_parse_object_arguments_are_serialized() {
        let body = json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"id": "c1", "function": {"name": "read_file", "arguments": {"path": "x"}}}
                    ]
                }
            }]
        });
        let response = OpenAiWire
            .parse_response(body.to_string().as_bytes())
            .unwrap();
        let args: Value = serde_json::from_str(&response.tool_calls[0].arguments).unwrap();
        assert_eq!(args, json!({"path": "x"}));
    }

    #[test]
    fn test_parse_empty_choices() {
        let result = OpenAiWire.parse_response(br#"{"choices": []}"#);
        assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_parse_missing_choices() {
        let result = OpenAiWire.parse_response(br#"{"id": "x"}"#);
        assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_parse_error_object() {
        let body = br#"{"error": {"message": "Invalid model", "code": 400}}"#;
        match OpenAiWire.parse_response(body) {
            Err(ProviderError::Api(message)) => assert_eq!(message, "Invalid model"),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_wins_over_choices() {
        let body = json!({
            "choices": [{"message": {"content": "hi"}}],
            "error": {"message": "upstream failed"}
        });
        let result = OpenAiWire.parse_response(body.to_string().as_bytes());
        assert!(matches!(result, Err(ProviderError::Api(_))));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = OpenAiWire.parse_response(b"<html>bad gateway</html>");
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }
}
