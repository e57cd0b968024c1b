//! Presence board: headcount, quorum message and the ordered status list.
//!
//! [`aggregate`] is a pure function of the status map and the current time,
//! so calling it twice with the same inputs yields the same board.

use chrono::Timelike;
use serde::Serialize;

use rollcall_protocol::{Category, StatusMap, StatusRecord};

use crate::quorum::QuorumPolicy;

pub const QUORUM_REACHED_MESSAGE: &str = "✓ Minimum reached!";
pub const EMPTY_BOARD_MESSAGE: &str = "No one has checked in yet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub present_count: usize,
    pub rolled_out_count: usize,
    pub required: u32,
    pub quorum: QuorumStatus,
    pub listing: Listing,
}

impl Board {
    /// Members counted toward the quorum. Rolled-out members count.
    pub fn effective_total(&self) -> usize {
        self.present_count + self.rolled_out_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuorumStatus {
    Short { missing: u32 },
    Reached,
}

impl QuorumStatus {
    pub fn message(&self) -> String {
        match self {
            QuorumStatus::Short { missing } => {
                let noun = if *missing == 1 { "person" } else { "people" };
                format!("Need {} more {}", missing, noun)
            }
            QuorumStatus::Reached => QUORUM_REACHED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum Listing {
    /// Nobody has ever set a status.
    NobodyCheckedIn,
    Entries(Vec<BoardEntry>),
}

impl Listing {
    pub fn entries(&self) -> &[BoardEntry] {
        match self {
            Listing::NobodyCheckedIn => &[],
            Listing::Entries(entries) => entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub name: String,
    pub category: Category,
    /// Category-specific lines, e.g. `Leaving at: 9:30 PM`.
    pub details: Vec<String>,
}

impl BoardEntry {
    fn from_record(name: &str, record: &StatusRecord) -> Self {
        let mut details = Vec::new();
        match record {
            StatusRecord::InRoom { leave_time } => {
                if let Some(time) = leave_time {
                    details.push(format!("Leaving at: {}", time.to_12_hour()));
                }
            }
            StatusRecord::RolledOut { rolled_out_by } => {
                if let Some(by) = rolled_out_by {
                    details.push(format!("Rolled out by: {}", by));
                }
            }
            StatusRecord::NotInRoom {
                arrival_time,
                reason,
            } => {
                if let Some(time) = arrival_time {
                    details.push(format!("Can come at: {}", time.to_12_hour()));
                }
                if let Some(reason) = reason {
                    details.push(format!("Reason: {}", reason));
                }
            }
        }

        Self {
            name: name.to_string(),
            category: record.category(),
            details,
        }
    }

    pub fn badge(&self) -> &'static str {
        self.category.label()
    }
}

pub fn quorum_status(effective_total: usize, required: u32) -> QuorumStatus {
    let total = u32::try_from(effective_total).unwrap_or(u32::MAX);
    if total < required {
        QuorumStatus::Short {
            missing: required - total,
        }
    } else {
        QuorumStatus::Reached
    }
}

pub fn aggregate<T: Timelike>(statuses: &StatusMap, now: &T, policy: &QuorumPolicy) -> Board {
    let count = |category: Category| {
        statuses
            .values()
            .filter(|record| record.category() == category)
            .count()
    };
    let present_count = count(Category::InRoom);
    let rolled_out_count = count(Category::RolledOut);
    let required = policy.minimum_required(now);

    let mut entries: Vec<BoardEntry> = statuses
        .iter()
        .map(|(name, record)| BoardEntry::from_record(name, record))
        .collect();
    entries.sort_by(|a, b| {
        a.category
            .priority()
            .cmp(&b.category.priority())
            .then_with(|| a.name.cmp(&b.name))
    });

    let listing = if entries.is_empty() {
        Listing::NobodyCheckedIn
    } else {
        Listing::Entries(entries)
    };

    Board {
        present_count,
        rolled_out_count,
        required,
        quorum: quorum_status(present_count + rolled_out_count, required),
        listing,
    }
}
