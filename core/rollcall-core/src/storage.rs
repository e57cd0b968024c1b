//! Storage configuration and path management for rollcall.
//!
//! All file paths used by the daemon and the CLI are decided here, so that
//! tests can point everything at a temp directory with
//! [`StorageConfig::with_root`].

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, RollcallError};

/// Overrides the root directory (default `~/.rollcall`).
pub const HOME_ENV: &str = "ROLLCALL_HOME";

/// Central configuration for all rollcall storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all rollcall data (default: ~/.rollcall)
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the root from `ROLLCALL_HOME`, falling back to `~/.rollcall`.
    pub fn resolve() -> Result<Self> {
        if let Ok(root) = env::var(HOME_ENV) {
            if !root.trim().is_empty() {
                return Ok(Self::with_root(PathBuf::from(root)));
            }
        }
        let home = dirs::home_dir().ok_or(RollcallError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(".rollcall")))
    }

    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to config.toml (server URL, roster, quorum overrides).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to data.json, the daemon's durable status map.
    pub fn data_file(&self) -> PathBuf {
        self.root.join("data.json")
    }

    /// Path to the client-side cache blob stored under `key`.
    pub fn cache_file(&self, key: &str) -> PathBuf {
        self.cache_dir().join(format!("{}.json", key))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Directories
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)?;
        fs_err::create_dir_all(self.cache_dir())?;
        fs_err::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_root_sets_custom_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/test-rollcall"));
        assert_eq!(config.root(), Path::new("/tmp/test-rollcall"));
    }

    #[test]
    fn test_file_paths() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/rollcall"));
        assert_eq!(config.data_file(), PathBuf::from("/tmp/rollcall/data.json"));
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/rollcall/config.toml")
        );
        assert_eq!(
            config.cache_file("roster-statuses"),
            PathBuf::from("/tmp/rollcall/cache/roster-statuses.json")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_structure() {
        let temp = TempDir::new().unwrap();
        let config = StorageConfig::with_root(temp.path().join("rollcall"));

        config.ensure_dirs().unwrap();

        assert!(config.root().exists());
        assert!(config.cache_dir().exists());
        assert!(config.logs_dir().exists());
    }
}
