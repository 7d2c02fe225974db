//! Cascata CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config file
//! - `chat`    — Interactive terminal chat
//! - `ask`     — Answer a single prompt and exit

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cascata",
    about = "Cascata — AI assistant with cascading provider fallback",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat interactively in the terminal
    Chat,

    /// Answer a single prompt and exit
    Ask {
        /// The prompt to answer
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat => commands::chat::run().await?,
        Commands::Ask { prompt } => commands::ask::run(&prompt).await?,
    }

    Ok(())
}
