//! Safety Copilot CLI
//!
//! Main entry point for the safety-copilot command-line tool.
//! Provides corpus ingestion and question-routing commands.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, RouteCommand};
use copilot_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Safety Copilot CLI - grounded answers over safety standards documents
#[derive(Parser, Debug)]
#[command(name = "safety-copilot")]
#[command(about = "Grounded answers over safety standards documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory of the PDF source tree
    #[arg(short, long, global = true, env = "COPILOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LLM provider (anthropic, openai, ollama)
    #[arg(short, long, global = true, env = "COPILOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier override
    #[arg(short, long, global = true, env = "COPILOT_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a PDF tree into chunks, emitted as JSON lines
    Ingest(IngestCommand),

    /// Show how a question would be routed and filtered
    Route(RouteCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.data_dir,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Safety Copilot CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Route(_) => "route",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config),
        Commands::Route(cmd) => cmd.execute(),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}
