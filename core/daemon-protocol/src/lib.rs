//! HTTP wire types and validation for rollcall-daemon.
//!
//! This crate is shared by the daemon and its clients to prevent schema drift.
//! The daemon remains the authority on validation, but clients can reuse the
//! same types to build valid requests and decode responses.
//!
//! A status record travels as a flat camelCase object. All five keys are
//! written; keys that do not belong to the record's category are `null`:
//!
//! ```json
//! { "category": "notInRoom", "leaveTime": null, "arrivalTime": "19:30",
//!   "reason": "Class", "rolledOutBy": null }
//! ```

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const MAX_REQUEST_BYTES: usize = 1024 * 1024; // 1MB

/// Message returned with 400 when a write is missing its name or status.
pub const MISSING_FIELDS_MESSAGE: &str = "Name and status are required";

/// Member name → current status. Members who never checked in have no key.
pub type StatusMap = BTreeMap<String, StatusRecord>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorInfo {}

// ═══════════════════════════════════════════════════════════════════════════════
// Clock time
// ═══════════════════════════════════════════════════════════════════════════════

/// A time of day without a date, as entered in a time picker (`"21:30"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Renders as `h:MM AM` / `h:MM PM`, e.g. `9:05 PM`, `12:00 AM`.
    pub fn to_12_hour(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = ErrorInfo;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(|time| Self(time.with_second(0).unwrap_or(time)))
            .map_err(|_| {
                ErrorInfo::new(
                    "invalid_time",
                    format!("'{}' is not a valid HH:MM time", trimmed),
                )
            })
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status records
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    InRoom,
    RolledOut,
    NotInRoom,
}

impl Category {
    /// Display order on the board: in room, then rolled out, then absent.
    pub fn priority(self) -> u8 {
        match self {
            Category::InRoom => 0,
            Category::RolledOut => 1,
            Category::NotInRoom => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::InRoom => "In Room",
            Category::RolledOut => "Rolled Out",
            Category::NotInRoom => "Not In Room",
        }
    }
}

/// Current state for one member.
///
/// Each variant carries only the fields that mean something for it, so a
/// reason can never outlive a move back into the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub enum StatusRecord {
    InRoom {
        leave_time: Option<ClockTime>,
    },
    RolledOut {
        rolled_out_by: Option<String>,
    },
    NotInRoom {
        arrival_time: Option<ClockTime>,
        reason: Option<String>,
    },
}

impl StatusRecord {
    pub fn in_room(leave_time: Option<ClockTime>) -> Self {
        StatusRecord::InRoom { leave_time }
    }

    pub fn rolled_out(rolled_out_by: Option<&str>) -> Self {
        StatusRecord::RolledOut {
            rolled_out_by: normalize_text(rolled_out_by),
        }
    }

    pub fn not_in_room(arrival_time: Option<ClockTime>, reason: Option<&str>) -> Self {
        StatusRecord::NotInRoom {
            arrival_time,
            reason: normalize_text(reason),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            StatusRecord::InRoom { .. } => Category::InRoom,
            StatusRecord::RolledOut { .. } => Category::RolledOut,
            StatusRecord::NotInRoom { .. } => Category::NotInRoom,
        }
    }

    pub fn leave_time(&self) -> Option<ClockTime> {
        match self {
            StatusRecord::InRoom { leave_time } => *leave_time,
            _ => None,
        }
    }

    pub fn arrival_time(&self) -> Option<ClockTime> {
        match self {
            StatusRecord::NotInRoom { arrival_time, .. } => *arrival_time,
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StatusRecord::NotInRoom { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn rolled_out_by(&self) -> Option<&str> {
        match self {
            StatusRecord::RolledOut { rolled_out_by } => rolled_out_by.as_deref(),
            _ => None,
        }
    }
}

/// Trims free text; blank input becomes `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Flat on-the-wire layout. `inRoom` is only read, for records written by
/// the older two-way clients that had no `category`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    #[serde(default)]
    category: Option<Category>,
    #[serde(default, skip_serializing)]
    in_room: Option<bool>,
    #[serde(default)]
    leave_time: Option<String>,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    rolled_out_by: Option<String>,
}

impl From<StatusRecord> for RecordWire {
    fn from(record: StatusRecord) -> Self {
        let mut wire = RecordWire {
            category: Some(record.category()),
            ..RecordWire::default()
        };
        match record {
            StatusRecord::InRoom { leave_time } => {
                wire.leave_time = leave_time.map(|time| time.to_string());
            }
            StatusRecord::RolledOut { rolled_out_by } => {
                wire.rolled_out_by = rolled_out_by;
            }
            StatusRecord::NotInRoom {
                arrival_time,
                reason,
            } => {
                wire.arrival_time = arrival_time.map(|time| time.to_string());
                wire.reason = reason;
            }
        }
        wire
    }
}

impl TryFrom<RecordWire> for StatusRecord {
    type Error = ErrorInfo;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        let category = match (wire.category, wire.in_room) {
            (Some(category), _) => category,
            (None, Some(true)) => Category::InRoom,
            (None, Some(false)) => Category::NotInRoom,
            (None, None) => {
                return Err(ErrorInfo::new("missing_field", "category is required"));
            }
        };

        // Fields outside the category are dropped unparsed.
        let record = match category {
            Category::InRoom => StatusRecord::InRoom {
                leave_time: parse_clock(wire.leave_time.as_deref())?,
            },
            Category::RolledOut => StatusRecord::rolled_out(wire.rolled_out_by.as_deref()),
            Category::NotInRoom => StatusRecord::NotInRoom {
                arrival_time: parse_clock(wire.arrival_time.as_deref())?,
                reason: normalize_text(wire.reason.as_deref()),
            },
        };
        Ok(record)
    }
}

/// Parses an optional clock field; blank input is treated as absent.
pub fn parse_clock(value: Option<&str>) -> Result<Option<ClockTime>, ErrorInfo> {
    match value.map(str::trim).filter(|trimmed| !trimmed.is_empty()) {
        Some(raw) => raw.parse().map(Some),
        None => Ok(None),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/status`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UpsertRequest {
    pub name: String,
    pub status: StatusRecord,
}

/// Body returned by successful `POST` and `DELETE` calls.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MutationResponse {
    pub success: bool,
    pub statuses: StatusMap,
}

impl MutationResponse {
    pub fn ok(statuses: StatusMap) -> Self {
        Self {
            success: true,
            statuses,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub members: usize,
}

/// Validates a raw `POST /api/status` body.
///
/// A missing or blank `name`, or a missing/null `status`, is reported with
/// [`MISSING_FIELDS_MESSAGE`]; a status that is present but malformed gets
/// the decoder's own message.
pub fn parse_upsert(params: Value) -> Result<UpsertRequest, ErrorInfo> {
    let object = params
        .as_object()
        .ok_or_else(|| ErrorInfo::new("missing_field", MISSING_FIELDS_MESSAGE))?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ErrorInfo::new("missing_field", MISSING_FIELDS_MESSAGE))?;

    let status = match object.get("status") {
        Some(status) if !is_blank(status) => status.clone(),
        _ => return Err(ErrorInfo::new("missing_field", MISSING_FIELDS_MESSAGE)),
    };

    let status: StatusRecord = serde_json::from_value(status).map_err(|err| {
        ErrorInfo::new("invalid_status", format!("status is invalid: {}", err))
    })?;

    Ok(UpsertRequest {
        name: name.to_string(),
        status,
    })
}

/// Null, `false`, zero and the empty string count as "no status given".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
