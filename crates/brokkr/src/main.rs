//! Brokkr CLI - Declarative plugin management
//!
//! This is the main entry point for the Brokkr command-line interface.

mod cli;
mod commands;
mod installer;
mod manifest;
mod output;
mod sink;
pub mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Run command
    match cli.command {
        Commands::Add(args) => commands::add::run(args, cli.manifest.as_deref()),
        Commands::Activate(args) => commands::activate::run(args, cli.manifest.as_deref()),
        Commands::Status(args) => commands::status::run(args, cli.manifest.as_deref()).await,
        Commands::Order(args) => commands::order::run(args, cli.manifest.as_deref()),
        Commands::Install(args) => commands::install::run(args, cli.manifest.as_deref()).await,
        Commands::Update(args) => commands::update::run(args, cli.manifest.as_deref()).await,
        Commands::Sync(args) => commands::sync::run(args, cli.manifest.as_deref()).await,
        Commands::Clean(args) => commands::clean::run(args, cli.manifest.as_deref()).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Default to info so activation progress is visible;
            // use --quiet to suppress, or -v/-vv for more detail
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
