//! Install command
//!
//! Clones every registered plugin source the store does not have yet.
//! Activation is a separate step; nothing is built or configured here.

use anyhow::Result;
use brokkr_core::types::InstallOptions;
use camino::Utf8Path;

use crate::cli::InstallArgs;
use crate::commands;
use crate::output;

pub async fn run(args: InstallArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::installer_manager(&session)?;

    let options = InstallOptions {
        force: args.force,
        concurrency: args.concurrency,
    };

    let spinner = output::spinner("Installing missing plugins...");
    let result = manager.install_missing(&options).await;
    spinner.finish_and_clear();

    let installed = result?;
    if installed.is_empty() {
        output::info("Nothing to install; the store is complete");
        return Ok(());
    }

    for id in &installed {
        output::success(&format!("Installed {}", id));
    }
    output::success(&format!(
        "Installed {} plugin(s) into {}",
        installed.len(),
        session.store_dir
    ));
    Ok(())
}
