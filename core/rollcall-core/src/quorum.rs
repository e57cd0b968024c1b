//! Time-dependent minimum headcount.
//!
//! Overnight (from `night_starts_at` up to, but not including,
//! `day_starts_at`) the room needs more people than during the day.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumPolicy {
    /// First hour (0-23) of the night bracket, inclusive.
    pub night_starts_at: u32,
    /// First hour (0-23) of the day bracket, inclusive.
    pub day_starts_at: u32,
    pub night_minimum: u32,
    pub day_minimum: u32,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            night_starts_at: 21,
            day_starts_at: 9,
            night_minimum: 20,
            day_minimum: 13,
        }
    }
}

impl QuorumPolicy {
    pub fn is_night(&self, hour: u32) -> bool {
        if self.night_starts_at > self.day_starts_at {
            hour >= self.night_starts_at || hour < self.day_starts_at
        } else {
            hour >= self.night_starts_at && hour < self.day_starts_at
        }
    }

    pub fn minimum_required<T: Timelike>(&self, now: &T) -> u32 {
        if self.is_night(now.hour()) {
            self.night_minimum
        } else {
            self.day_minimum
        }
    }
}

/// Minimum headcount under the default policy: 20 from 21:00 until 09:00,
/// 13 otherwise.
pub fn minimum_required<T: Timelike>(now: &T) -> u32 {
    QuorumPolicy::default().minimum_required(now)
}
