//! Plugin manifest loading
//!
//! The manifest is a YAML file whose entries use any of the three
//! declarative spec shapes: a bare locator string, a table with a `src`
//! field, or a positional list.

use anyhow::{Context, Result};
use brokkr_core::types::SpecInput;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Declarative plugin manifest (brokkr.yaml)
#[derive(Debug, Deserialize)]
pub struct PluginManifest {
    /// Plugin entries
    #[serde(default)]
    pub plugins: Vec<SpecInput>,

    /// Store directory override
    #[serde(default)]
    pub store_dir: Option<Utf8PathBuf>,
}

impl PluginManifest {
    /// Load and parse a manifest file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path))?;
        let manifest: PluginManifest = serde_yaml_ng::from_str(&raw)
            .with_context(|| format!("Failed to parse manifest {}", path))?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brokkr.yaml");
        std::fs::write(&path, content).unwrap();
        (dir, Utf8PathBuf::from_path_buf(path).unwrap())
    }

    #[test]
    fn test_load_accepts_all_three_entry_shapes() {
        let (_dir, path) = write_manifest(
            r#"
plugins:
  - owner/statusline
  - src: owner/linter
    commands: [Lint]
  - - owner/picker
    - lazy: true
"#,
        );

        let manifest = PluginManifest::load(&path).unwrap();
        assert_eq!(manifest.plugins.len(), 3);
        assert!(matches!(manifest.plugins[0], SpecInput::Locator(_)));
        assert!(matches!(manifest.plugins[1], SpecInput::Table(_)));
        assert!(matches!(manifest.plugins[2], SpecInput::Positional(_)));
    }

    #[test]
    fn test_load_reads_store_dir_override() {
        let (_dir, path) = write_manifest("plugins: []\nstore_dir: /opt/brokkr/plugins\n");

        let manifest = PluginManifest::load(&path).unwrap();
        assert_eq!(
            manifest.store_dir,
            Some(Utf8PathBuf::from("/opt/brokkr/plugins"))
        );
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let err = PluginManifest::load(Utf8Path::new("/nonexistent/brokkr.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/brokkr.yaml"));
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let (_dir, path) = write_manifest("plugins: [unclosed\n");
        let err = PluginManifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
