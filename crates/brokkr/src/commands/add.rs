//! Add command
//!
//! Registers the manifest's plugins, activates the eager ones in
//! dependency order, and parks the lazy ones behind their triggers.

use anyhow::Result;
use brokkr_core::types::SpecInput;
use camino::Utf8Path;

use crate::cli::AddArgs;
use crate::commands;
use crate::output;

pub fn run(args: AddArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;

    let mut entries = session.manifest.plugins.clone();
    entries.extend(args.plugins.iter().cloned().map(SpecInput::Locator));

    if entries.is_empty() {
        output::info("Manifest declares no plugins");
        return Ok(());
    }

    let mut manager = commands::new_manager(&session.store_dir);
    let report = manager.add_plugins(&entries)?;

    for id in &report.activated {
        output::success(&format!("Activated {}", id));
    }
    for id in &report.lazy {
        output::info(&format!("{} parked until a trigger fires", id));
    }
    for failed in &report.failed {
        output::error(&format!(
            "{} failed during {}: {}",
            failed.id, failed.phase, failed.error
        ));
    }

    if args.ready {
        manager.host_ready();
    }

    println!();
    output::kv("Activated", &report.activated.len().to_string());
    output::kv("Lazy", &report.lazy.len().to_string());
    output::kv("Failed", &report.failed.len().to_string());

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} plugin(s) failed",
            report.failed.len(),
            report.total
        );
    }

    output::success(&format!(
        "Added {} plugin(s) from {}",
        report.total, session.manifest_path
    ));
    Ok(())
}
