//! Git-backed package installer
//!
//! Fetches plugin sources with plain git processes: shallow clones into
//! the store directory, fast-forward pulls for updates, and a directory
//! scan for the installed listing. Install and update batches run
//! concurrently up to the configured bound; everything else is
//! sequential.

use async_trait::async_trait;
use brokkr_core::types::{InstallOptions, InstalledPlugin, PluginSpec};
use brokkr_core::{Error, Result};
use brokkr_plugins::PackageInstaller;
use camino::{Utf8Path, Utf8PathBuf};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Installer that keeps one git checkout per plugin id under the store
/// directory
pub struct GitInstaller {
    store_dir: Utf8PathBuf,
}

impl GitInstaller {
    /// Create an installer rooted at the given store directory
    ///
    /// Fails when no git binary is on the PATH.
    pub fn new(store_dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        which::which("git").map_err(|_| Error::installer("git not found on PATH"))?;
        Ok(Self {
            store_dir: store_dir.into(),
        })
    }

    /// The directory plugin checkouts live under
    pub fn store_dir(&self) -> &Utf8Path {
        &self.store_dir
    }

    async fn clone_plugin(&self, spec: &PluginSpec, force: bool) -> Result<()> {
        if !is_git_source(&spec.source) {
            return Err(Error::installer(format!(
                "'{}' has an unsupported source locator: {}",
                spec.id, spec.source
            )));
        }

        let destination = self.store_dir.join(&spec.id);
        if destination.exists() {
            if !force {
                debug!("'{}' already present at {}", spec.id, destination);
                return Ok(());
            }
            tokio::fs::remove_dir_all(&destination)
                .await
                .map_err(|e| Error::installer(format!("failed to clear {}: {}", destination, e)))?;
        }

        info!("Cloning {} -> {}", spec.source, destination);

        let mut cmd = Command::new("git");
        cmd.arg("clone").arg("--depth").arg("1");

        if let Some(version) = &spec.version {
            cmd.arg("--branch").arg(version);
        }

        cmd.arg(&spec.source).arg(destination.as_str());

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::installer(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::installer(format!(
                "clone of '{}' failed: {}",
                spec.id,
                stderr.trim()
            )));
        }

        debug!("'{}' cloned", spec.id);
        Ok(())
    }

    async fn pull_plugin(&self, id: &str) -> Result<()> {
        let checkout = self.store_dir.join(id);
        if !checkout.is_dir() {
            warn!("'{}' is not installed, skipping update", id);
            return Ok(());
        }

        debug!("Updating '{}'", id);

        let output = Command::new("git")
            .current_dir(&checkout)
            .args(["pull", "--ff-only"])
            .output()
            .await
            .map_err(|e| Error::installer(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::installer(format!(
                "update of '{}' failed: {}",
                id,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Origin URL of a checkout, when git can report one
    async fn remote_url(&self, checkout: &Path) -> Option<String> {
        let output = Command::new("git")
            .current_dir(checkout)
            .args(["config", "--get", "remote.origin.url"])
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!url.is_empty()).then_some(url)
    }
}

#[async_trait]
impl PackageInstaller for GitInstaller {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn install(&self, specs: &[PluginSpec], options: &InstallOptions) -> Result<()> {
        if specs.is_empty() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.store_dir)
            .await
            .map_err(|e| {
                Error::installer(format!("failed to create {}: {}", self.store_dir, e))
            })?;

        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let mut fetches = FuturesUnordered::new();

        for spec in specs {
            let semaphore = Arc::clone(&semaphore);
            fetches.push(async move {
                let _permit = semaphore.acquire().await.ok();
                self.clone_plugin(spec, options.force)
                    .await
                    .map_err(|e| (spec.id.clone(), e))
            });
        }

        let mut failures = Vec::new();
        while let Some(result) = fetches.next().await {
            if let Err((id, e)) = result {
                warn!("Install of '{}' failed: {}", id, e);
                failures.push(id);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::installer(format!(
                "failed to install: {}",
                failures.join(", ")
            )))
        }
    }

    async fn update(&self, ids: &[String], options: &InstallOptions) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let mut pulls = FuturesUnordered::new();

        for id in ids {
            let semaphore = Arc::clone(&semaphore);
            pulls.push(async move {
                let _permit = semaphore.acquire().await.ok();
                self.pull_plugin(id).await.map_err(|e| (id.clone(), e))
            });
        }

        let mut failures = Vec::new();
        while let Some(result) = pulls.next().await {
            if let Err((id, e)) = result {
                warn!("Update of '{}' failed: {}", id, e);
                failures.push(id);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::installer(format!(
                "failed to update: {}",
                failures.join(", ")
            )))
        }
    }

    async fn list_installed(&self) -> Result<Vec<InstalledPlugin>> {
        if !self.store_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.store_dir)
            .await
            .map_err(|e| Error::installer(format!("failed to read {}: {}", self.store_dir, e)))?;

        let mut installed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::installer(format!("failed to read {}: {}", self.store_dir, e)))?
        {
            let path = entry.path();
            // Only git checkouts count as installed
            if !path.join(".git").exists() {
                continue;
            }

            let Some(id) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            let source = self.remote_url(&path).await.unwrap_or_default();
            installed.push(InstalledPlugin {
                id: id.to_string(),
                source,
            });
        }

        installed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(installed)
    }

    async fn remove(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            let checkout = self.store_dir.join(id);
            if !checkout.exists() {
                debug!("'{}' is not installed, nothing to remove", id);
                continue;
            }

            info!("Removing {}", checkout);
            tokio::fs::remove_dir_all(&checkout)
                .await
                .map_err(|e| Error::installer(format!("failed to remove '{}': {}", id, e)))?;
        }
        Ok(())
    }
}

/// Whether a source locator looks like something git can fetch
fn is_git_source(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("git@") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, GitInstaller) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let installer = GitInstaller::new(path).unwrap();
        (dir, installer)
    }

    #[test]
    fn test_is_git_source() {
        assert!(is_git_source("https://github.com/user/repo.git"));
        assert!(is_git_source("git@github.com:user/repo.git"));
        assert!(is_git_source("http://example.com/repo.git"));
        assert!(!is_git_source("user/repo"));
        assert!(!is_git_source(""));
    }

    #[tokio::test]
    async fn test_list_installed_empty_when_store_missing() {
        let installer = GitInstaller::new("/nonexistent/brokkr-store").unwrap();
        let installed = installer.list_installed().await.unwrap();
        assert!(installed.is_empty());
    }

    #[tokio::test]
    async fn test_list_installed_skips_non_checkouts() {
        let (dir, installer) = store();

        std::fs::create_dir_all(dir.path().join("real-plugin/.git")).unwrap();
        std::fs::create_dir(dir.path().join("stray-dir")).unwrap();
        std::fs::write(dir.path().join("stray-file"), "x").unwrap();

        let installed = installer.list_installed().await.unwrap();
        let ids: Vec<&str> = installed.iter().map(|plugin| plugin.id.as_str()).collect();
        assert_eq!(ids, vec!["real-plugin"]);
    }

    #[tokio::test]
    async fn test_remove_deletes_only_named_checkouts() {
        let (dir, installer) = store();

        std::fs::create_dir_all(dir.path().join("doomed/.git")).unwrap();
        std::fs::create_dir_all(dir.path().join("kept/.git")).unwrap();

        installer.remove(&["doomed".to_string()]).await.unwrap();

        assert!(!dir.path().join("doomed").exists());
        assert!(dir.path().join("kept").exists());
    }

    #[tokio::test]
    async fn test_remove_tolerates_absent_ids() {
        let (_dir, installer) = store();
        installer.remove(&["ghost".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_clone_rejects_short_form_sources() {
        let (_dir, installer) = store();

        let spec = PluginSpec {
            id: "odd".to_string(),
            source: "not-a-url".to_string(),
            version: None,
            priority: 50,
        };

        let err = installer.clone_plugin(&spec, false).await.unwrap_err();
        assert!(err.to_string().contains("unsupported source locator"));
    }

    #[tokio::test]
    async fn test_install_failure_names_the_plugins() {
        let (_dir, installer) = store();

        let spec = PluginSpec {
            id: "odd".to_string(),
            source: "not-a-url".to_string(),
            version: None,
            priority: 50,
        };

        let err = installer
            .install(&[spec], &InstallOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to install: odd"));
    }
}
