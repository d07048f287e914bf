//! Integration tests for praktor-session
//!
//! A full multi-turn exchange, checked message by message.

use praktor_provider::{Message, Role, ToolCall};
use praktor_session::Conversation;

#[test]
fn test_full_exchange_keeps_append_order() {
    let mut conversation = Conversation::new();

    conversation.push_user("What is in src?").unwrap();
    conversation
        .push_assistant(
            "Let me look.",
            vec![ToolCall::new("c1", "list_files", r#"{"path":"src"}"#)],
        )
        .unwrap();
    conversation.push_tool_result("c1", r#"["main.rs"]"#).unwrap();
    conversation
        .push_assistant("src contains main.rs", Vec::new())
        .unwrap();
    conversation.push_user("Thanks").unwrap();

    let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant, Role::User]
    );

    assert_eq!(conversation.messages()[2], Message::tool("c1", r#"["main.rs"]"#));
    assert_eq!(conversation.last(), Some(&Message::user("Thanks")));
}

#[test]
fn test_tool_result_ids_match_calls() {
    let mut conversation = Conversation::new();
    conversation.push_user("read both").unwrap();
    conversation
        .push_assistant(
            "",
            vec![
                ToolCall::new("a", "read_file", r#"{"path":"x"}"#),
                ToolCall::new("b", "read_file", r#"{"path":"y"}"#),
            ],
        )
        .unwrap();
    conversation.push_tool_result("a", "X").unwrap();
    conversation.push_tool_result("b", "Y").unwrap();

    let issued: Vec<&str> = conversation.messages()[1]
        .tool_calls
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    let answered: Vec<&str> = conversation.messages()[2..]
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(issued, answered);
}

#[test]
fn test_messages_serialize_for_debugging() {
    let mut conversation = Conversation::new();
    conversation.push_user("hi").unwrap();
    let json = serde_json::to_value(conversation.messages()).unwrap();
    assert_eq!(json[0]["role"], "user");
    assert_eq!(json[0]["content"], "hi");
}
