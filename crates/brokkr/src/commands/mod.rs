//! CLI command implementations

pub mod activate;
pub mod add;
pub mod clean;
pub mod install;
pub mod order;
pub mod status;
pub mod sync;
pub mod update;

use anyhow::Result;
use brokkr_plugins::{AddOptions, PluginManager};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

use crate::installer::GitInstaller;
use crate::manifest::PluginManifest;
use crate::sink::LoggingSink;
use crate::utils;

/// Manifest plus the paths resolved around it
pub(crate) struct Session {
    pub manifest: PluginManifest,
    pub manifest_path: Utf8PathBuf,
    pub store_dir: Utf8PathBuf,
}

/// Locate and load the manifest, then settle the store directory
pub(crate) fn load_session(manifest_arg: Option<&Utf8Path>) -> Result<Session> {
    let manifest_path = utils::find_manifest(manifest_arg)?;
    let manifest = PluginManifest::load(&manifest_path)?;
    let store_dir = match &manifest.store_dir {
        Some(dir) => dir.clone(),
        None => utils::get_store_dir()?,
    };
    Ok(Session {
        manifest,
        manifest_path,
        store_dir,
    })
}

/// Empty manager wired to the CLI trigger sink
pub(crate) fn new_manager(store_dir: &Utf8Path) -> PluginManager {
    PluginManager::new(Box::new(LoggingSink::new())).with_store_dir(store_dir.to_path_buf())
}

/// Manager holding the manifest's registry without having activated
/// anything
///
/// Entry and resolution problems are logged and tolerated so read-only
/// and installer commands can still work with the rest of the registry.
pub(crate) fn registry_manager(session: &Session) -> PluginManager {
    let mut manager = new_manager(&session.store_dir);

    match manager.add_plugins_with(
        &session.manifest.plugins,
        &AddOptions {
            skip_activation: true,
        },
    ) {
        Ok(report) => {
            for failed in &report.failed {
                warn!("Skipped {}: {}", failed.id, failed.error);
            }
        }
        Err(e) => warn!("Dependency resolution failed: {}", e),
    }

    manager
}

/// [`registry_manager`](registry_manager) with a git installer attached
pub(crate) fn installer_manager(session: &Session) -> Result<PluginManager> {
    let installer = GitInstaller::new(session.store_dir.clone())?;
    Ok(registry_manager(session).with_installer(Box::new(installer)))
}
