//! Types exchanged with the external package installer

use serde::{Deserialize, Serialize};

fn default_concurrency() -> usize {
    4
}

/// One installed artifact reported by the installer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPlugin {
    /// Plugin id
    pub id: String,

    /// Source locator the artifact was fetched from
    pub source: String,
}

/// Options forwarded to installer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Reinstall artifacts that are already present
    #[serde(default)]
    pub force: bool,

    /// Upper bound on concurrent fetches inside the installer
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            force: false,
            concurrency: default_concurrency(),
        }
    }
}
