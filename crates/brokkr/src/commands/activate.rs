//! Activate command
//!
//! Force-activates one plugin, pulling its dependencies in first. The
//! rest of the manifest is registered but left alone.

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::ActivateArgs;
use crate::commands;
use crate::output;

pub fn run(args: ActivateArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let mut manager = commands::registry_manager(&session);

    manager.activate(&args.name)?;

    output::success(&format!("Activated {}", args.name));
    Ok(())
}
