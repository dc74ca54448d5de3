//! Deskmate CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive terminal chat
//! - `serve`    — Start the HTTP chat widget
//! - `history`  — Inspect or reset the stored conversation
//! - `init`     — Write a default `deskmate.toml` and prompt template
//! - `doctor`   — Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "deskmate",
    about = "Deskmate — role-configurable AI assistant for small businesses",
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
    /// Chat with the assistant in the terminal
    Chat {
        /// Business description; prompted for when omitted
        #[arg(short, long, env = "DESKMATE_BUSINESS_CONTEXT")]
        context: Option<String>,

        /// Assistant role: sales, support or manager
        #[arg(short, long, env = "DESKMATE_ROLE")]
        role: Option<String>,
    },

    /// Start the HTTP chat widget
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or reset the stored conversation
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Write a default config file and prompt template
    Init,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print stored turns
    Show {
        /// Only the most recent N turns
        #[arg(short, long)]
        last: Option<usize>,

        /// Print the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Reset the stored conversation to empty
    Clear,

    /// Print the history file location
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    // `.env` values land in the process environment before config loads.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing (stderr, so chat output on stdout stays clean)
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Errors are reported with their Display text, once.
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Chat { context, role } => commands::chat::run(context, role).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::History { action } => match action {
            HistoryAction::Show { last, json } => commands::history::show(last, json).await?,
            HistoryAction::Clear => commands::history::clear().await?,
            HistoryAction::Path => commands::history::path()?,
        },
        Commands::Init => commands::init::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
