//! Praktor command implementations

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use praktor_agent::{AgentLoop, ReaderLines, ToolRegistry};
use praktor_config::Config;
use praktor_provider::HttpProvider;

use crate::terminal::TerminalOutput;

/// Interactive chat on stdin/stdout until end of input
pub async fn chat_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = match &config_path {
        Some(path) => Config::load_from(path).await,
        None => Config::load().await,
    }
    .context("Failed to load config")?;

    let provider_config = config.resolve_provider_from_env()?;
    info!(
        "Using {:?} endpoint {} with model {}",
        provider_config.wire_format, provider_config.endpoint, provider_config.model
    );

    let workspace = config.workspace_path();
    let tools = ToolRegistry::with_builtin_tools(&workspace)
        .context("Failed to register tools")?;
    info!("Tools rooted at {:?}: {:?}", workspace, tools.names());

    let provider = HttpProvider::new(provider_config);
    let mut agent = AgentLoop::new(provider, tools).with_max_tokens(config.max_tokens());

    let mut output = TerminalOutput::new();
    output.banner();

    let mut input = ReaderLines::stdin();
    agent.run(&mut input, &mut output).await?;

    Ok(())
}
