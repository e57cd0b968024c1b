//! Client-side fallback copy of the status map.
//!
//! A single JSON blob stored under a fixed key. It is written on every local
//! write and read only when the remote store cannot be reached.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use rollcall_protocol::StatusMap;

use crate::error::{Result, RollcallError};
use crate::storage::StorageConfig;

pub const CACHE_KEY: &str = "roster-statuses";

#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            path: storage.cache_file(CACHE_KEY),
        }
    }

    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when nothing was cached yet or the blob is unreadable.
    pub fn load(&self) -> Option<StatusMap> {
        let content = match fs_err::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read local status cache");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(statuses) => Some(statuses),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Local status cache is corrupt, ignoring"
                );
                None
            }
        }
    }

    pub fn save(&self, statuses: &StatusMap) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs_err::create_dir_all(parent)
            .map_err(|source| cache_io("creating cache directory", source))?;

        let content = serde_json::to_vec(statuses).map_err(|source| RollcallError::Json {
            context: "serializing status cache".to_string(),
            source,
        })?;

        let mut temp_file =
            NamedTempFile::new_in(parent).map_err(|source| cache_io("creating temp cache", source))?;
        temp_file
            .write_all(&content)
            .map_err(|source| cache_io("writing temp cache", source))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| cache_io("committing cache", err.error))?;
        Ok(())
    }
}

fn cache_io(context: &str, source: std::io::Error) -> RollcallError {
    RollcallError::Io {
        context: context.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_protocol::StatusRecord;
    use tempfile::TempDir;

    #[test]
    fn load_without_file_is_none() {
        let temp = TempDir::new().unwrap();
        let cache = LocalCache::new(&StorageConfig::with_root(temp.path().to_path_buf()));
        assert!(cache.load().is_none());
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let cache = LocalCache::new(&StorageConfig::with_root(temp.path().to_path_buf()));
        let mut statuses = StatusMap::new();
        statuses.insert("DJ".into(), StatusRecord::rolled_out(Some("Owen Rowe")));

        cache.save(&statuses).unwrap();

        assert_eq!(cache.load(), Some(statuses));
        assert!(cache.path().ends_with("cache/roster-statuses.json"));
    }

    #[test]
    fn corrupt_blob_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(LocalCache::at(&path).load().is_none());
    }
}
