//! Per-operator editing state: pick a member, pick a category, fill in the
//! fields that category allows, submit.
//!
//! ```text
//! NoSelection ──select(member)──▶ Selected { editing: None | Some(category) }
//!      ▲                                │
//!      └──────────select(None)──────────┘
//! ```
//!
//! Selecting a member pre-fills the draft from that member's current record.
//! Choosing a category clears every draft field the category does not use,
//! so a submitted record never carries values from a previous category.

use rollcall_protocol::{parse_clock, Category, ClockTime, StatusMap, StatusRecord};

use crate::roster::Roster;
use crate::store::StatusStore;
use crate::sync::{SubmitOutcome, SyncEngine};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No member selected")]
    NoSelection,

    #[error("No status category chosen")]
    NoCategory,

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("{field} does not apply to the chosen status")]
    FieldNotEditable { field: &'static str },

    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

/// Editable fields for the selected member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub editing: Option<Category>,
    pub leave_time: Option<ClockTime>,
    pub arrival_time: Option<ClockTime>,
    pub reason: String,
    pub rolled_out_by: String,
}

impl Draft {
    fn from_record(record: Option<&StatusRecord>) -> Self {
        let Some(record) = record else {
            return Draft::default();
        };
        Draft {
            editing: Some(record.category()),
            leave_time: record.leave_time(),
            arrival_time: record.arrival_time(),
            reason: record.reason().unwrap_or_default().to_string(),
            rolled_out_by: record.rolled_out_by().unwrap_or_default().to_string(),
        }
    }

    fn keep_only(&mut self, category: Category) {
        if category != Category::InRoom {
            self.leave_time = None;
        }
        if category != Category::NotInRoom {
            self.arrival_time = None;
            self.reason.clear();
        }
        if category != Category::RolledOut {
            self.rolled_out_by.clear();
        }
    }

    fn to_record(&self) -> Result<StatusRecord, SessionError> {
        let record = match self.editing.ok_or(SessionError::NoCategory)? {
            Category::InRoom => StatusRecord::in_room(self.leave_time),
            Category::RolledOut => StatusRecord::rolled_out(Some(self.rolled_out_by.as_str())),
            Category::NotInRoom => {
                StatusRecord::not_in_room(self.arrival_time, Some(self.reason.as_str()))
            }
        };
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NoSelection,
    Selected { member: String, draft: Draft },
}

#[derive(Debug, Clone)]
pub struct Session {
    roster: Roster,
    state: SessionState,
}

impl Session {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            state: SessionState::NoSelection,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selected_member(&self) -> Option<&str> {
        match &self.state {
            SessionState::Selected { member, .. } => Some(member),
            SessionState::NoSelection => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            SessionState::Selected { draft, .. } => Some(draft),
            SessionState::NoSelection => None,
        }
    }

    pub fn editing(&self) -> Option<Category> {
        self.draft().and_then(|draft| draft.editing)
    }

    /// `None` or a blank name collapses back to `NoSelection`. An unknown
    /// name is rejected and leaves the current state untouched.
    pub fn select(
        &mut self,
        member: Option<&str>,
        statuses: &StatusMap,
    ) -> Result<(), SessionError> {
        let member = match member.map(str::trim).filter(|name| !name.is_empty()) {
            Some(member) => member,
            None => {
                self.state = SessionState::NoSelection;
                return Ok(());
            }
        };

        if !self.roster.contains(member) {
            return Err(SessionError::UnknownMember(member.to_string()));
        }

        self.state = SessionState::Selected {
            member: member.to_string(),
            draft: Draft::from_record(statuses.get(member)),
        };
        Ok(())
    }

    pub fn choose(&mut self, category: Category) -> Result<(), SessionError> {
        let draft = self.draft_mut()?;
        draft.editing = Some(category);
        draft.keep_only(category);
        Ok(())
    }

    pub fn set_leave_time(&mut self, value: &str) -> Result<(), SessionError> {
        let time = parse_time(value)?;
        self.field_for(Category::InRoom, "leave time")?.leave_time = time;
        Ok(())
    }

    pub fn set_arrival_time(&mut self, value: &str) -> Result<(), SessionError> {
        let time = parse_time(value)?;
        self.field_for(Category::NotInRoom, "arrival time")?.arrival_time = time;
        Ok(())
    }

    pub fn set_reason(&mut self, value: &str) -> Result<(), SessionError> {
        self.field_for(Category::NotInRoom, "reason")?.reason = value.to_string();
        Ok(())
    }

    pub fn set_rolled_out_by(&mut self, value: &str) -> Result<(), SessionError> {
        self.field_for(Category::RolledOut, "rolled out by")?.rolled_out_by = value.to_string();
        Ok(())
    }

    /// Builds the record to submit; free text is trimmed and blanks dropped.
    pub fn build_record(&self) -> Result<(String, StatusRecord), SessionError> {
        match &self.state {
            SessionState::NoSelection => Err(SessionError::NoSelection),
            SessionState::Selected { member, draft } => Ok((member.clone(), draft.to_record()?)),
        }
    }

    /// Hands the built record to the sync engine. Store failures are the
    /// engine's concern; only local editing errors are returned here.
    pub fn submit<S: StatusStore>(
        &self,
        engine: &mut SyncEngine<S>,
    ) -> Result<SubmitOutcome, SessionError> {
        let (member, record) = self.build_record()?;
        Ok(engine.submit(&member, record))
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, SessionError> {
        match &mut self.state {
            SessionState::Selected { draft, .. } => Ok(draft),
            SessionState::NoSelection => Err(SessionError::NoSelection),
        }
    }

    fn field_for(
        &mut self,
        category: Category,
        field: &'static str,
    ) -> Result<&mut Draft, SessionError> {
        let draft = self.draft_mut()?;
        match draft.editing {
            Some(editing) if editing == category => Ok(draft),
            Some(_) => Err(SessionError::FieldNotEditable { field }),
            None => Err(SessionError::NoCategory),
        }
    }
}

fn parse_time(value: &str) -> Result<Option<ClockTime>, SessionError> {
    parse_clock(Some(value)).map_err(|err| SessionError::InvalidTime(err.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::quorum::QuorumPolicy;
    use crate::store::MemoryStatusStore;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(Roster::new(["Alex Nania", "DJ", "Owen Rowe"]))
    }

    #[test]
    fn select_prefills_from_existing_record() {
        let mut statuses = StatusMap::new();
        statuses.insert(
            "DJ".into(),
            StatusRecord::not_in_room(ClockTime::new(20, 0), Some("Gym")),
        );
        let mut session = session();

        session.select(Some("DJ"), &statuses).unwrap();

        let draft = session.draft().unwrap();
        assert_eq!(draft.editing, Some(Category::NotInRoom));
        assert_eq!(draft.reason, "Gym");
        assert_eq!(draft.arrival_time, ClockTime::new(20, 0));
    }

    #[test]
    fn select_without_record_starts_blank() {
        let mut session = session();
        session.select(Some("Owen Rowe"), &StatusMap::new()).unwrap();
        assert_eq!(session.draft(), Some(&Draft::default()));
        assert_eq!(session.editing(), None);
    }

    #[test]
    fn empty_selection_collapses_to_no_selection() {
        let mut session = session();
        session.select(Some("DJ"), &StatusMap::new()).unwrap();
        session.select(Some("  "), &StatusMap::new()).unwrap();
        assert_eq!(session.state(), &SessionState::NoSelection);
        assert_eq!(session.choose(Category::InRoom), Err(SessionError::NoSelection));
    }

    #[test]
    fn unknown_member_is_rejected() {
        let mut session = session();
        session.select(Some("DJ"), &StatusMap::new()).unwrap();
        let err = session.select(Some("Stranger"), &StatusMap::new()).unwrap_err();
        assert_eq!(err, SessionError::UnknownMember("Stranger".into()));
        assert_eq!(session.selected_member(), Some("DJ"));
    }

    #[test]
    fn switching_category_clears_stale_fields() {
        let mut statuses = StatusMap::new();
        statuses.insert("DJ".into(), StatusRecord::not_in_room(None, Some("Class")));
        let mut session = session();
        session.select(Some("DJ"), &statuses).unwrap();

        session.choose(Category::InRoom).unwrap();
        session.set_leave_time("23:00").unwrap();
        let (_, record) = session.build_record().unwrap();

        assert_eq!(record, StatusRecord::in_room(ClockTime::new(23, 0)));
        assert_eq!(record.reason(), None);
        assert_eq!(session.draft().unwrap().reason, "");
    }

    #[test]
    fn fields_outside_category_are_refused() {
        let mut session = session();
        session.select(Some("DJ"), &StatusMap::new()).unwrap();
        assert_eq!(session.set_reason("x"), Err(SessionError::NoCategory));

        session.choose(Category::InRoom).unwrap();
        assert_eq!(
            session.set_reason("x"),
            Err(SessionError::FieldNotEditable { field: "reason" })
        );
    }

    #[test]
    fn build_record_trims_and_normalizes_blanks() {
        let mut session = session();
        session.select(Some("Alex Nania"), &StatusMap::new()).unwrap();
        session.choose(Category::NotInRoom).unwrap();
        session.set_reason("   ").unwrap();
        session.set_arrival_time("").unwrap();

        let (member, record) = session.build_record().unwrap();
        assert_eq!(member, "Alex Nania");
        assert_eq!(
            record,
            StatusRecord::NotInRoom {
                arrival_time: None,
                reason: None
            }
        );

        session.choose(Category::RolledOut).unwrap();
        session.set_rolled_out_by("  Owen Rowe ").unwrap();
        let (_, record) = session.build_record().unwrap();
        assert_eq!(record.rolled_out_by(), Some("Owen Rowe"));
    }

    #[test]
    fn invalid_time_is_reported() {
        let mut session = session();
        session.select(Some("DJ"), &StatusMap::new()).unwrap();
        session.choose(Category::InRoom).unwrap();
        assert!(matches!(
            session.set_leave_time("tonight"),
            Err(SessionError::InvalidTime(_))
        ));
    }

    #[test]
    fn submit_goes_through_engine() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStatusStore::new();
        let cache = LocalCache::at(&temp.path().join("cache.json"));
        let mut engine = SyncEngine::new(store, cache, QuorumPolicy::default());
        let mut session = session();

        assert_eq!(session.submit(&mut engine), Err(SessionError::NoSelection));

        session.select(Some("DJ"), engine.statuses()).unwrap();
        assert_eq!(session.submit(&mut engine), Err(SessionError::NoCategory));

        session.choose(Category::InRoom).unwrap();
        assert_eq!(session.submit(&mut engine), Ok(SubmitOutcome::Stored));
        assert_eq!(
            engine.store().get_all().unwrap().get("DJ"),
            Some(&StatusRecord::in_room(None))
        );
    }
}
