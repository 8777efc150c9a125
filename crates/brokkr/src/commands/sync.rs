//! Sync command
//!
//! Brings the store in line with the manifest: installs what is
//! missing, then updates everything enabled.

use anyhow::Result;
use brokkr_core::types::InstallOptions;
use camino::Utf8Path;

use crate::cli::SyncArgs;
use crate::commands;
use crate::output;

pub async fn run(args: SyncArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::installer_manager(&session)?;

    let options = InstallOptions {
        force: args.force,
        concurrency: args.concurrency,
    };

    let spinner = output::spinner("Synchronizing plugin store...");
    let result = manager.sync_all(&options).await;
    spinner.finish_and_clear();

    let report = result?;
    for id in &report.installed {
        output::success(&format!("Installed {}", id));
    }
    for id in &report.updated {
        output::success(&format!("Updated {}", id));
    }

    output::success(&format!(
        "Store in sync: {} installed, {} updated",
        report.installed.len(),
        report.updated.len()
    ));
    Ok(())
}
