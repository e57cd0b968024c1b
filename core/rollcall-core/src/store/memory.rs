use std::sync::{Mutex, MutexGuard};

use rollcall_protocol::{StatusMap, StatusRecord};

use super::{validate_member, StatusStore};
use crate::error::StoreError;

/// Process-local store. Shared between simulated clients in tests by
/// wrapping it in an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    statuses: Mutex<StatusMap>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: StatusMap) -> Self {
        Self {
            statuses: Mutex::new(statuses),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StatusMap>, StoreError> {
        self.statuses
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl StatusStore for MemoryStatusStore {
    fn get_all(&self) -> Result<StatusMap, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn upsert(&self, member: &str, record: StatusRecord) -> Result<StatusMap, StoreError> {
        let member = validate_member(member)?;
        let mut statuses = self.lock()?;
        statuses.insert(member.to_string(), record);
        Ok(statuses.clone())
    }

    fn remove(&self, member: &str) -> Result<StatusMap, StoreError> {
        let mut statuses = self.lock()?;
        statuses.remove(member.trim());
        Ok(statuses.clone())
    }
}
