//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Brokkr - Declarative plugin management
#[derive(Parser, Debug)]
#[command(name = "brokkr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the brokkr.yaml plugin manifest
    #[arg(short, long, global = true)]
    pub manifest: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register manifest plugins and activate the eager ones
    Add(AddArgs),

    /// Activate one registered plugin now
    Activate(ActivateArgs),

    /// Show the plugin registry
    Status(StatusArgs),

    /// Show the dependency-resolved activation order
    Order(OrderArgs),

    /// Install plugin sources missing from the store
    Install(InstallArgs),

    /// Update installed plugin sources
    Update(UpdateArgs),

    /// Install missing sources, then update everything
    Sync(SyncArgs),

    /// Remove installed sources no registered plugin claims
    Clean(CleanArgs),
}

// Add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Extra plugin locators to register alongside the manifest
    pub plugins: Vec<String>,

    /// Fire ready-category triggers once the batch is done
    #[arg(long)]
    pub ready: bool,
}

// Activate command
#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// Plugin id to activate
    pub name: String,
}

// Status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,

    /// Machine-readable JSON
    Json,
}

// Order command
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Reinstall sources that are already present
    #[arg(short, long)]
    pub force: bool,

    /// Upper bound on concurrent fetches
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}

// Update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Plugins to update (default: every enabled plugin)
    pub plugins: Vec<String>,

    /// Upper bound on concurrent fetches
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}

// Sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Reinstall sources that are already present
    #[arg(short, long)]
    pub force: bool,

    /// Upper bound on concurrent fetches
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}

// Clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}
