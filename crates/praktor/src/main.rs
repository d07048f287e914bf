//! Praktor - chat with a model that can work on your files

use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

use commands::chat_command;

/// Praktor - a coding agent for your terminal
#[derive(Parser)]
#[command(name = "praktor")]
#[command(about = "Chat with an LLM that can read, list and edit files in your workspace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of ~/.praktor/config.json
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = chat_command(cli.config).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
