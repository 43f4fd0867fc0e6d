//! Docent CLI
//!
//! Main entry point for the docent command-line tool: agentic question
//! answering that routes between an indexed document corpus and web search.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, RetrieveCommand, StatsCommand};
use docent_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Docent - agentic knowledge search over internal documents and the web
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(about = "Agentic knowledge search over internal documents and the web", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCENT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the document corpus to index (file or directory)
    #[arg(short, long, global = true, env = "DOCENT_DOCUMENT")]
    document: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai, claude)
    #[arg(short, long, global = true, env = "DOCENT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCENT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question using internal documents and web search
    Ask(AskCommand),

    /// Retrieve document context for a query (no agent loop)
    Retrieve(RetrieveCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.document,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    // Reject a broken configuration before any work happens
    config.validate()?;

    tracing::info!("Docent starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Document: {:?}", config.document_path);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Retrieve(_) => "retrieve",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Retrieve(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result?;
    Ok(())
}
