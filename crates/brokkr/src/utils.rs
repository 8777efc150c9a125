//! Utility functions shared across CLI commands

use anyhow::{anyhow, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

/// Get the brokkr home directory
///
/// Prefers the BROKKR_HOME environment variable so containers and test
/// harnesses can relocate all state; otherwise ~/.brokkr under the
/// platform home directory.
pub fn get_brokkr_dir() -> Result<Utf8PathBuf> {
    if let Ok(home) = std::env::var("BROKKR_HOME") {
        return Ok(Utf8PathBuf::from(home));
    }

    let base = BaseDirs::new().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let home = Utf8PathBuf::from_path_buf(base.home_dir().to_path_buf())
        .map_err(|path| anyhow!("Home directory is not UTF-8: {}", path.display()))?;
    Ok(home.join(".brokkr"))
}

/// Get the plugin store directory (~/.brokkr/plugins)
///
/// Cloned plugin sources live here, one directory per plugin id.
pub fn get_store_dir() -> Result<Utf8PathBuf> {
    Ok(get_brokkr_dir()?.join("plugins"))
}

/// Find the plugin manifest
///
/// Priority: the explicit --manifest flag, brokkr.yaml in the working
/// directory, then ~/.brokkr/brokkr.yaml.
pub fn find_manifest(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!("Manifest not found: {}", path));
    }

    let local = Utf8PathBuf::from("brokkr.yaml");
    if local.is_file() {
        return Ok(local);
    }

    let fallback = get_brokkr_dir()?.join("brokkr.yaml");
    if fallback.is_file() {
        return Ok(fallback);
    }

    Err(anyhow!(
        "No brokkr.yaml found; pass --manifest or create one in the working directory"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_brokkr_home_env_var_wins() {
        std::env::set_var("BROKKR_HOME", "/tmp/brokkr-test-home");

        let dir = get_brokkr_dir().unwrap();
        assert_eq!(dir, Utf8PathBuf::from("/tmp/brokkr-test-home"));
        assert_eq!(
            get_store_dir().unwrap(),
            Utf8PathBuf::from("/tmp/brokkr-test-home/plugins")
        );

        std::env::remove_var("BROKKR_HOME");
    }

    #[test]
    #[serial]
    fn test_brokkr_dir_falls_back_to_home() {
        std::env::remove_var("BROKKR_HOME");

        let dir = get_brokkr_dir().unwrap();
        assert!(dir.as_str().ends_with(".brokkr"));
    }

    #[test]
    fn test_explicit_manifest_must_exist() {
        let missing = Utf8Path::new("/nonexistent/brokkr.yaml");
        let err = find_manifest(Some(missing)).unwrap_err();
        assert!(err.to_string().contains("Manifest not found"));
    }

    #[test]
    fn test_explicit_manifest_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brokkr.yaml");
        std::fs::write(&path, "plugins: []\n").unwrap();

        let utf8 = Utf8PathBuf::from_path_buf(path).unwrap();
        let found = find_manifest(Some(&utf8)).unwrap();
        assert_eq!(found, utf8);
    }
}
