//! Update command
//!
//! Fast-forwards installed plugin checkouts, either the named ones or
//! every enabled plugin.

use anyhow::Result;
use brokkr_core::types::InstallOptions;
use camino::Utf8Path;

use crate::cli::UpdateArgs;
use crate::commands;
use crate::output;

pub async fn run(args: UpdateArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::installer_manager(&session)?;

    let options = InstallOptions {
        force: false,
        concurrency: args.concurrency,
    };
    let targets = if args.plugins.is_empty() {
        None
    } else {
        Some(args.plugins.as_slice())
    };

    let spinner = output::spinner("Updating plugins...");
    let result = manager.update_plugins(targets, &options).await;
    spinner.finish_and_clear();

    let updated = result?;
    if updated.is_empty() {
        output::info("Nothing to update");
        return Ok(());
    }

    for id in &updated {
        output::success(&format!("Updated {}", id));
    }
    Ok(())
}
