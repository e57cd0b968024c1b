//! JSON-file-backed status store.
//!
//! # File Format
//!
//! A single JSON object keyed by member name:
//!
//! ```json
//! {
//!   "Owen Rowe": { "category": "inRoom", "leaveTime": "22:30", ... }
//! }
//! ```
//!
//! # Reads
//!
//! - Empty file reads as an empty map
//! - A record that fails to decode is skipped (logged), the rest still load
//! - Writes edit only the target key, so undecodable records survive them
//! - A file that is not a JSON object is `Unavailable` and is never rewritten
//!
//! # Atomic Writes
//!
//! Every mutation is read-modify-write under a mutex and committed with
//! temp file + rename, so readers never observe a half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use rollcall_protocol::{StatusMap, StatusRecord};

use super::{validate_member, StatusStore};
use crate::error::StoreError;

#[derive(Debug)]
pub struct FileStatusStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStatusStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty `{}` file if none exists.
    pub fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)
                .map_err(|err| StoreError::unavailable("Failed to create data directory", err))?;
        }
        if !self.path.exists() {
            self.write(&StatusMap::new())?;
            tracing::info!(path = %self.path.display(), "Initialized empty status file");
        }
        Ok(())
    }

    fn read_raw(&self) -> Result<Map<String, Value>, StoreError> {
        let content = fs_err::read_to_string(&self.path)
            .map_err(|err| StoreError::unavailable("Failed to read status file", err))?;

        if content.trim().is_empty() {
            tracing::warn!(path = %self.path.display(), "Empty status file, treating as {{}}");
            return Ok(Map::new());
        }

        serde_json::from_str(&content)
            .map_err(|err| StoreError::unavailable("Failed to parse status file", err))
    }

    fn read(&self) -> Result<StatusMap, StoreError> {
        Ok(decode_records(self.read_raw()?))
    }

    fn write<T: Serialize>(&self, statuses: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(statuses)
            .map_err(|err| StoreError::unavailable("Failed to serialize statuses", err))?;

        let parent_dir = self
            .path
            .parent()
            .ok_or_else(|| StoreError::Unavailable("Status file has no parent directory".into()))?;
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .map_err(|err| StoreError::unavailable("Temp file error", err))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|err| StoreError::unavailable("Failed to write temp status file", err))?;
        temp_file
            .flush()
            .map_err(|err| StoreError::unavailable("Failed to flush temp status file", err))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| StoreError::unavailable("Failed to commit status file", err.error))?;
        Ok(())
    }

    /// Edits the raw object so entries this build cannot decode are written
    /// back untouched.
    fn mutate<F>(&self, apply: F) -> Result<StatusMap, StoreError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("status file lock poisoned".to_string()))?;
        let mut raw = self.read_raw()?;
        apply(&mut raw);
        self.write(&raw)?;
        Ok(decode_records(raw))
    }
}

fn decode_records(raw: Map<String, Value>) -> StatusMap {
    let mut statuses = StatusMap::new();
    for (name, value) in raw {
        match serde_json::from_value::<StatusRecord>(value) {
            Ok(record) => {
                statuses.insert(name, record);
            }
            Err(err) => {
                tracing::warn!(member = %name, error = %err, "Skipping unreadable status record");
            }
        }
    }
    statuses
}

impl StatusStore for FileStatusStore {
    fn get_all(&self) -> Result<StatusMap, StoreError> {
        self.read()
    }

    fn upsert(&self, member: &str, record: StatusRecord) -> Result<StatusMap, StoreError> {
        let member = validate_member(member)?.to_string();
        let value = serde_json::to_value(record)
            .map_err(|err| StoreError::unavailable("Failed to serialize status", err))?;
        self.mutate(move |raw| {
            raw.insert(member, value);
        })
    }

    fn remove(&self, member: &str) -> Result<StatusMap, StoreError> {
        let member = member.trim();
        self.mutate(|raw| {
            raw.remove(member);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_protocol::ClockTime;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> FileStatusStore {
        let store = FileStatusStore::new(&temp.path().join("data").join("data.json"));
        store.init().unwrap();
        store
    }

    #[test]
    fn init_writes_empty_object() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim(), "{}");
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn init_keeps_existing_data() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.upsert("DJ", StatusRecord::in_room(None)).unwrap();

        store.init().unwrap();
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn upsert_round_trips_through_disk() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let record = StatusRecord::not_in_room(ClockTime::new(18, 45), Some("Practice"));

        store.upsert("Reid Hammer", record.clone()).unwrap();

        let reopened = FileStatusStore::new(store.path());
        assert_eq!(
            reopened.get_all().unwrap().get("Reid Hammer"),
            Some(&record)
        );
    }

    #[test]
    fn upsert_replaces_whole_record() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store
            .upsert("DJ", StatusRecord::not_in_room(None, Some("Class")))
            .unwrap();
        store
            .upsert("DJ", StatusRecord::in_room(ClockTime::new(22, 0)))
            .unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap())
            .unwrap();
        assert_eq!(raw["DJ"]["category"], "inRoom");
        assert!(raw["DJ"]["reason"].is_null());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let store = FileStatusStore::new(&temp.path().join("absent.json"));
        assert!(store.get_all().unwrap_err().is_unavailable());
    }

    #[test]
    fn corrupt_file_is_unavailable_and_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStatusStore::new(&path);

        assert!(store.upsert("DJ", StatusRecord::in_room(None)).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn bad_record_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"DJ": {"category": "inRoom"}, "Broken": {"reason": "no category"}}"#,
        )
        .unwrap();
        let store = FileStatusStore::new(&path);

        let statuses = store.get_all().unwrap();
        assert_eq!(statuses.len(), 1);
        assert!(statuses.contains_key("DJ"));
    }

    #[test]
    fn write_keeps_records_it_cannot_decode() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"DJ": {"category": "onBreak", "reason": "Nap"}, "Will Reem": {"inRoom": true}}"#,
        )
        .unwrap();
        let store = FileStatusStore::new(&path);

        let statuses = store.upsert("Owen Rowe", StatusRecord::in_room(None)).unwrap();
        assert!(!statuses.contains_key("DJ"));
        assert!(statuses.contains_key("Will Reem"));

        store.remove("Will Reem").unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["DJ"]["category"], "onBreak");
        assert_eq!(raw["DJ"]["reason"], "Nap");
        assert!(raw.get("Will Reem").is_none());
        assert_eq!(raw["Owen Rowe"]["category"], "inRoom");
    }

    #[test]
    fn remove_deletes_entry() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.upsert("DJ", StatusRecord::in_room(None)).unwrap();
        store.upsert("Will Reem", StatusRecord::in_room(None)).unwrap();

        let statuses = store.remove("DJ").unwrap();
        assert!(!statuses.contains_key("DJ"));
        assert!(statuses.contains_key("Will Reem"));
        assert!(store.remove("DJ").is_ok());
    }
}
