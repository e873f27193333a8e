// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Availability responses: one slot set per (meeting, user).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// First bookable hour of the day (08:00).
pub const HOUR_START: u8 = 8;
/// Last bookable hour of the day (22:00).
pub const HOUR_END: u8 = 22;

/// One hour-long cell of the availability grid.
///
/// `hour = 9` means 09:00-10:00 on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TimeSlot {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    pub hour: u8,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, hour: u8) -> Self {
        Self { date, hour }
    }
}

/// A participant's availability for one meeting.
///
/// Stored in `meeting_responses`; the store keeps at most one per
/// `(meeting_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AvailabilityResponse {
    pub meeting_id: String,
    /// Discord user ID
    pub user_id: String,
    pub display_name: String,
    /// Discord avatar hash
    pub avatar_hash: Option<String>,
    /// Sorted, de-duplicated slots
    pub slots: Vec<TimeSlot>,
    /// Last write time (RFC 3339)
    pub updated_at: String,
}

/// Unvalidated slot as it arrives in a request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSlot {
    pub date: String,
    pub hour: i64,
}
