//! Order command
//!
//! Prints the dependency-resolved activation order. A cycle in the
//! manifest is fatal here, with the offending chain in the error.

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::OrderArgs;
use crate::commands;
use crate::output;

pub fn run(args: OrderArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::registry_manager(&session);

    let order = manager.resolution_order()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(());
    }

    if order.is_empty() {
        output::info("Manifest declares no plugins");
        return Ok(());
    }

    output::header("Activation order");
    for (position, id) in order.iter().enumerate() {
        println!("  {:>2}. {}", position + 1, id);
    }

    Ok(())
}
