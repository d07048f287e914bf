//! Conversation history for one process run
//!
//! Append-only: messages are never reordered, edited or dropped. Tool results
//! must answer the latest assistant turn's calls in the order they were
//! issued, and nothing else may be appended while any of them is unanswered.

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::trace;

use praktor_provider::{Message, Role, ToolCall};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("tool result for unknown call '{got}' (expected {expected:?})")]
    UnknownToolCall {
        got: String,
        expected: Option<String>,
    },

    #[error("{0} tool call(s) still awaiting results")]
    PendingToolCalls(usize),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Ordered message log owned by the agent loop
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    started_at: DateTime<Local>,
    updated_at: DateTime<Local>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Local::now();
        Self {
            messages: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn updated_at(&self) -> DateTime<Local> {
        self.updated_at
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<()> {
        self.ensure_settled()?;
        self.append(Message::user(content));
        Ok(())
    }

    /// Append one assistant turn, with or without tool calls
    pub fn push_assistant(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Result<()> {
        self.ensure_settled()?;
        self.append(Message::assistant_with_tools(content, tool_calls));
        Ok(())
    }

    /// Append the result of the next unanswered tool call
    pub fn push_tool_result(
        &mut self,
        call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let call_id = call_id.into();
        let expected = self.pending_tool_calls().first().map(|id| id.to_string());
        if expected.as_deref() != Some(call_id.as_str()) {
            return Err(SessionError::UnknownToolCall {
                got: call_id,
                expected,
            });
        }
        self.append(Message::tool(call_id, content));
        Ok(())
    }

    /// Ids from the latest assistant turn still lacking a tool result, in call order
    pub fn pending_tool_calls(&self) -> Vec<&str> {
        let Some(turn) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };

        let answered = self.messages[turn + 1..]
            .iter()
            .filter(|m| m.role == Role::Tool)
            .count();

        self.messages[turn]
            .tool_calls
            .iter()
            .skip(answered)
            .map(|call| call.id.as_str())
            .collect()
    }

    pub fn is_settled(&self) -> bool {
        self.pending_tool_calls().is_empty()
    }

    fn ensure_settled(&self) -> Result<()> {
        match self.pending_tool_calls().len() {
            0 => Ok(()),
            n => Err(SessionError::PendingToolCalls(n)),
        }
    }

    fn append(&mut self, message: Message) {
        trace!(
            "Conversation[{}] += {}",
            self.messages.len(),
            message.role.as_str()
        );
        self.messages.push(message);
        self.updated_at = Local::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
