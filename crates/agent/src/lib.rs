//! Agent core
//!
//! Tool registry, the built-in filesystem tools, and the loop that
//! alternates between model inference and tool execution.

use thiserror::Error;

pub mod io;
pub mod loop_agent;
pub mod tools;

pub use io::{ChatOutput, LineSource, ReaderLines, ScriptedLines};
pub use loop_agent::{AgentLoop, LoopState};
pub use tools::{ToolError, ToolRegistry, ToolTrait};

/// Fatal agent errors. Tool failures never end up here.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error(transparent)]
    Provider(#[from] praktor_provider::ProviderError),

    #[error("conversation error: {0}")]
    Session(#[from] praktor_session::SessionError),

    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
