//! Status stores: durable member → record maps.
//!
//! A store exposes read-all, upsert-one and remove-one. Every mutation
//! returns the full map as it stands after the write. Writes replace the
//! whole record for a member (last writer wins); nothing is merged
//! field-by-field.

mod file;
mod memory;

pub use file::FileStatusStore;
pub use memory::MemoryStatusStore;

use std::sync::Arc;

use rollcall_protocol::{StatusMap, StatusRecord};

use crate::error::StoreError;

pub trait StatusStore {
    fn get_all(&self) -> Result<StatusMap, StoreError>;

    fn upsert(&self, member: &str, record: StatusRecord) -> Result<StatusMap, StoreError>;

    /// Removing a member without a record succeeds and changes nothing.
    fn remove(&self, member: &str) -> Result<StatusMap, StoreError>;
}

impl<S: StatusStore + ?Sized> StatusStore for Arc<S> {
    fn get_all(&self) -> Result<StatusMap, StoreError> {
        (**self).get_all()
    }

    fn upsert(&self, member: &str, record: StatusRecord) -> Result<StatusMap, StoreError> {
        (**self).upsert(member, record)
    }

    fn remove(&self, member: &str) -> Result<StatusMap, StoreError> {
        (**self).remove(member)
    }
}

pub(crate) fn validate_member(member: &str) -> Result<&str, StoreError> {
    let trimmed = member.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput(
            rollcall_protocol::MISSING_FIELDS_MESSAGE.to_string(),
        ));
    }
    Ok(trimmed)
}
