//! Tool registry and dispatch

pub mod filesystem;

pub use filesystem::{EditFileTool, ListFilesTool, ReadFileTool};

use async_trait::async_trait;
use praktor_provider::{ToolCall, ToolSpec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::AgentError;

/// Tool failures. These are reported back to the model, never fatal.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid input parameters: {0}")]
    Validation(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("{0} is a directory")]
    IsDirectory(String),

    #[error("old_str not found in file")]
    OldStrNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}

pub fn to_tool_spec(tool: &dyn ToolTrait) -> ToolSpec {
    ToolSpec::new(tool.name(), tool.description(), tool.parameters())
}

/// Decode serialized tool arguments. Blank input decodes as `{}`.
pub fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, ToolError> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Name → tool map, validated at registration
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry with `read_file`, `list_files` and `edit_file` rooted at `root`
    pub fn with_builtin_tools(root: impl Into<PathBuf>) -> crate::Result<Self> {
        let root = root.into();
        let mut registry = Self::new();
        registry.register(ReadFileTool::new(root.clone()))?;
        registry.register(ListFilesTool::new(root.clone()))?;
        registry.register(EditFileTool::new(root))?;
        Ok(registry)
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) -> crate::Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.tools.insert(name, Box::new(tool));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn definitions(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|t| to_tool_spec(t.as_ref()))
            .collect()
    }

    /// Run one tool call. Always yields text for the model, even on failure.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        let Some(tool) = self.get(&call.name) else {
            warn!("Model requested unknown tool '{}'", call.name);
            return format!("Error: tool not found: {}", call.name);
        };

        debug!("Executing tool: {} ({})", call.name, call.id);
        match tool.execute(&call.arguments).await {
            Ok(output) => output,
            Err(e) => {
                debug!("Tool {} failed: {}", call.name, e);
                format!("Error: {}", e)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
