mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rande")]
#[command(about = "Track research events, notes and papers, with optional remote mirroring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar events
    #[command(subcommand)]
    Events(commands::events::EventsCommand),

    /// Research notes for the selected researcher
    #[command(subcommand)]
    Notes(commands::notes::NotesCommand),

    /// Paper library
    #[command(subcommand)]
    Papers(commands::papers::PapersCommand),

    /// Select who owns new notes
    #[command(subcommand)]
    Researcher(commands::researcher::ResearcherCommand),

    /// Mirror the collections to the configured remote store
    #[command(subcommand)]
    Sync(commands::sync::SyncCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Events(cmd) => commands::events::run(cmd).await,
        Commands::Notes(cmd) => commands::notes::run(cmd).await,
        Commands::Papers(cmd) => commands::papers::run(cmd).await,
        Commands::Researcher(cmd) => commands::researcher::run(cmd),
        Commands::Sync(cmd) => commands::sync::run(cmd).await,
    }
}
