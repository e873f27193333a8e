// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meeting model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Prefix for generated meeting codes.
pub const MEETING_ID_PREFIX: &str = "MTG-";

/// Longest date range a meeting may span, in days (inclusive).
pub const MAX_RANGE_DAYS: i64 = 31;

/// Meeting record stored in the `meetings` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Meeting {
    /// Short opaque code (also used as document ID)
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Creator's estimate of how many people will respond
    pub participants_count: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date_range_start: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date_range_end: NaiveDate,
    /// Discord user ID of the creator
    pub creator_id: String,
    pub creator_name: String,
    /// Guild the meeting was created from, if any
    pub guild_id: Option<String>,
    /// Channel the meeting was created from, if any
    pub channel_id: Option<String>,
    /// Creation time (RFC 3339)
    pub created_at: String,
}

impl Meeting {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.date_range_start,
            end: self.date_range_end,
        }
    }

    /// Whether `date` falls inside the meeting's range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_range_start <= date && date <= self.date_range_end
    }
}

/// A validated, inclusive date range (`start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!(
                "Start date {start} must not be after end date {end}"
            ));
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(format!(
                "Date range spans {days} days; at most {MAX_RANGE_DAYS} are allowed"
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD ~ YYYY-MM-DD`. A single date means a one-day range.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut parts = input.split('~').map(str::trim);
        let start_raw = parts.next().unwrap_or_default();
        let end_raw = parts.next().unwrap_or(start_raw);

        if parts.next().is_some() {
            return Err("Use the format YYYY-MM-DD ~ YYYY-MM-DD".to_string());
        }

        let start = parse_iso_date(start_raw)?;
        let end = parse_iso_date(end_raw)?;
        Self::new(start, end)
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    // chrono accepts unpadded fields; require the canonical width.
    if raw.len() != 10 {
        return Err(format!("Invalid date '{raw}': expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{raw}': expected YYYY-MM-DD"))
}

/// Generate a meeting code from the creation time: `MTG-` + base36 millis.
pub fn generate_meeting_id(now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis().max(0) as u64;
    let mut digits = Vec::new();
    loop {
        let d = (millis % 36) as u8;
        digits.push(if d < 10 { b'0' + d } else { b'A' + d - 10 });
        millis /= 36;
        if millis == 0 {
            break;
        }
    }
    digits.reverse();
    format!(
        "{MEETING_ID_PREFIX}{}",
        String::from_utf8_lossy(&digits)
    )
}
