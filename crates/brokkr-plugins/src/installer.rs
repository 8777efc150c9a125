//! Package installer trait definition
//!
//! The registry owns no fetch or storage behavior. Everything that touches
//! plugin artifacts goes through this capability, supplied by the embedder.

use async_trait::async_trait;
use brokkr_core::types::{InstallOptions, InstalledPlugin, PluginSpec};
use brokkr_core::Result;

/// External capability that fetches, updates, and removes plugin artifacts
///
/// Implementations report failures as [`brokkr_core::Error::Installer`];
/// the registry surfaces them to callers as-is without reinterpretation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Get the installer name
    fn name(&self) -> &'static str;

    /// Fetch artifacts for the given specs
    async fn install(&self, specs: &[PluginSpec], options: &InstallOptions) -> Result<()>;

    /// Update artifacts for the given plugin ids
    async fn update(&self, ids: &[String], options: &InstallOptions) -> Result<()>;

    /// List artifacts currently present in storage
    async fn list_installed(&self) -> Result<Vec<InstalledPlugin>>;

    /// Remove artifacts for the given plugin ids
    async fn remove(&self, ids: &[String]) -> Result<()>;
}
