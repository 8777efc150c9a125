//! Clean command
//!
//! Removes installed plugin sources no registered plugin claims. The
//! registry itself is untouched; only the store shrinks.

use anyhow::Result;
use brokkr_plugins::PackageInstaller;
use camino::Utf8Path;
use dialoguer::Confirm;

use crate::cli::CleanArgs;
use crate::commands;
use crate::installer::GitInstaller;
use crate::output;

pub async fn run(args: CleanArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::installer_manager(&session)?;

    // Preview the orphans before prompting
    let installer = GitInstaller::new(session.store_dir.clone())?;
    let orphans: Vec<String> = installer
        .list_installed()
        .await?
        .into_iter()
        .map(|plugin| plugin.id)
        .filter(|id| !manager.registry().has(id))
        .collect();

    if orphans.is_empty() {
        output::info("Store has no unused plugins");
        return Ok(());
    }

    output::info(&format!("Removing {} unused plugin(s):", orphans.len()));
    for id in &orphans {
        println!("  - {}", id);
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    let removed = manager.remove_unused().await?;
    for id in &removed {
        output::success(&format!("Removed {}", id));
    }
    Ok(())
}
