//! Status command
//!
//! Renders the registry snapshot, with a store column showing which
//! plugin sources are actually on disk.

use anyhow::Result;
use brokkr_plugins::PackageInstaller;
use camino::Utf8Path;
use std::collections::HashSet;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::{OutputFormat, StatusArgs};
use crate::commands;
use crate::installer::GitInstaller;
use crate::output;

#[derive(Tabled)]
struct PluginRow {
    id: String,
    version: String,
    priority: i32,
    lazy: String,
    installed: String,
    source: String,
}

pub async fn run(args: StatusArgs, manifest_path: Option<&Utf8Path>) -> Result<()> {
    let session = commands::load_session(manifest_path)?;
    let manager = commands::registry_manager(&session);
    let snapshot = manager.snapshot();

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if snapshot.is_empty() {
        output::info("Manifest declares no plugins");
        return Ok(());
    }

    let installed = installed_ids(&session.store_dir).await;

    let rows: Vec<PluginRow> = snapshot
        .plugins
        .iter()
        .map(|status| PluginRow {
            id: status.id.clone(),
            version: status.version.clone().unwrap_or_else(|| "-".to_string()),
            priority: status.priority,
            lazy: yes_no(status.lazy),
            installed: match &installed {
                Some(ids) => yes_no(ids.contains(&status.id)),
                None => "-".to_string(),
            },
            source: status.source.clone(),
        })
        .collect();

    output::header(&format!("Plugins ({})", session.manifest_path));
    println!("{}", Table::new(&rows).with(Style::sharp()));
    output::kv("Store", session.store_dir.as_str());

    Ok(())
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Ids present in the store, when the store is scannable
async fn installed_ids(store_dir: &Utf8Path) -> Option<HashSet<String>> {
    let installer = GitInstaller::new(store_dir.to_path_buf()).ok()?;
    let installed = installer.list_installed().await.ok()?;
    Some(installed.into_iter().map(|plugin| plugin.id).collect())
}
