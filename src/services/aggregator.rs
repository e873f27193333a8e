// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Availability aggregation.
//!
//! Builds the date x hour grid for a meeting, stores per-user slot sets and
//! folds every stored set into per-slot counts for the overlap heatmap.
//!
//! Counts always exclude the viewer's own response; the viewer's current
//! selection is added back per cell when computing heat.

use crate::db::MeetingStore;
use crate::error::{AppError, Result};
use crate::models::meeting::parse_iso_date;
use crate::models::{
    AvailabilityResponse, Meeting, RawSlot, SessionUser, TimeSlot, HOUR_END, HOUR_START,
};
use crate::time_utils::{dates_inclusive, format_utc_rfc3339};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The full grid for a meeting: every date in range, each with every hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub dates: Vec<NaiveDate>,
    pub hours: Vec<u8>,
}

impl Grid {
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.dates
            .iter()
            .flat_map(move |&date| self.hours.iter().map(move |&hour| TimeSlot::new(date, hour)))
    }
}

pub fn build_grid(meeting: &Meeting) -> Grid {
    Grid {
        dates: dates_inclusive(meeting.date_range_start, meeting.date_range_end),
        hours: (HOUR_START..=HOUR_END).collect(),
    }
}

/// Per-slot counts of everyone except the viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub counts: HashMap<TimeSlot, u32>,
    pub max_count: u32,
}

impl Aggregate {
    pub fn count(&self, slot: &TimeSlot) -> u32 {
        self.counts.get(slot).copied().unwrap_or(0)
    }
}

/// Fold responses into per-slot counts, skipping `viewer_id`'s own response.
///
/// `max_count` is at least 1, and leaves room for the viewer's own mark when
/// there is a viewer.
pub fn aggregate(responses: &[AvailabilityResponse], viewer_id: Option<&str>) -> Aggregate {
    let mut counts: HashMap<TimeSlot, u32> = HashMap::new();

    for response in responses {
        if viewer_id == Some(response.user_id.as_str()) {
            continue;
        }
        for slot in &response.slots {
            *counts.entry(*slot).or_default() += 1;
        }
    }

    let largest = counts.values().copied().max().unwrap_or(0);
    let viewer_bonus = u32::from(viewer_id.is_some());

    Aggregate {
        counts,
        max_count: (largest + viewer_bonus).max(1),
    }
}

/// Cell opacity: 0 when nobody is free, else scaled into `0.2..=0.8`.
pub fn heat_opacity(count: u32, max_count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    0.2 + (f64::from(count) / f64::from(max_count.max(1))) * 0.6
}

/// Validate submitted slots and normalise them (sorted, de-duplicated).
pub fn validate_slots(raw: Vec<RawSlot>) -> Result<Vec<TimeSlot>> {
    let mut slots = BTreeSet::new();

    for (index, slot) in raw.into_iter().enumerate() {
        let date = parse_iso_date(&slot.date)
            .map_err(|e| AppError::InvalidInput(format!("available_slots[{index}]: {e}")))?;

        let hour = u8::try_from(slot.hour)
            .ok()
            .filter(|h| (HOUR_START..=HOUR_END).contains(h))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "available_slots[{index}]: hour {} outside {HOUR_START}..={HOUR_END}",
                    slot.hour
                ))
            })?;

        slots.insert(TimeSlot::new(date, hour));
    }

    Ok(slots.into_iter().collect())
}

// ─── Heatmap ─────────────────────────────────────────────────

/// One grid cell as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HeatmapCell {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    /// Respondents other than the viewer who marked this slot
    pub others: u32,
    /// Whether the viewer's saved response includes this slot
    pub selected: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HeatmapRow {
    pub hour: u8,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Heatmap {
    pub meeting_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string[]"))]
    pub dates: Vec<NaiveDate>,
    pub hours: Vec<u8>,
    pub max_count: u32,
    pub respondents: usize,
    pub my_slots: Vec<TimeSlot>,
    pub rows: Vec<HeatmapRow>,
}

/// Store-backed aggregator used by the HTTP handlers.
#[derive(Clone)]
pub struct AvailabilityAggregator {
    store: Arc<dyn MeetingStore>,
}

impl AvailabilityAggregator {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self { store }
    }

    async fn meeting(&self, meeting_id: &str) -> Result<Meeting> {
        self.store
            .get_meeting(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Meeting {meeting_id} not found")))
    }

    /// Replace `user`'s slot set for a meeting.
    ///
    /// `slots` must already be shape-validated; this checks the meeting exists
    /// and that every slot falls inside its date range.
    pub async fn upsert(
        &self,
        meeting_id: &str,
        user: &SessionUser,
        slots: Vec<TimeSlot>,
    ) -> Result<AvailabilityResponse> {
        let meeting = self.meeting(meeting_id).await?;

        if let Some(outside) = slots.iter().find(|s| !meeting.covers(s.date)) {
            return Err(AppError::InvalidInput(format!(
                "Date {} is outside the meeting range {} ~ {}",
                outside.date, meeting.date_range_start, meeting.date_range_end
            )));
        }

        let response = AvailabilityResponse {
            meeting_id: meeting.id,
            user_id: user.id.clone(),
            display_name: user.username.clone(),
            avatar_hash: user.avatar.clone(),
            slots,
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let stored = self.store.upsert_response(&response).await?;

        tracing::info!(
            meeting_id = %stored.meeting_id,
            user_id = %stored.user_id,
            slots = stored.slots.len(),
            "Availability saved"
        );

        Ok(stored)
    }

    /// Heatmap for `meeting_id` from `viewer_id`'s point of view.
    pub async fn heatmap(&self, meeting_id: &str, viewer_id: Option<&str>) -> Result<Heatmap> {
        let meeting = self.meeting(meeting_id).await?;
        let responses = self.store.list_responses(meeting_id).await?;

        let grid = build_grid(&meeting);
        let agg = aggregate(&responses, viewer_id);

        let my_slots: Vec<TimeSlot> = viewer_id
            .and_then(|id| responses.iter().find(|r| r.user_id == id))
            .map(|r| r.slots.clone())
            .unwrap_or_default();
        let mine: BTreeSet<TimeSlot> = my_slots.iter().copied().collect();

        let rows = grid
            .hours
            .iter()
            .map(|&hour| HeatmapRow {
                hour,
                cells: grid
                    .dates
                    .iter()
                    .map(|&date| {
                        let slot = TimeSlot::new(date, hour);
                        let others = agg.count(&slot);
                        let selected = mine.contains(&slot);
                        HeatmapCell {
                            date,
                            others,
                            selected,
                            opacity: heat_opacity(others + u32::from(selected), agg.max_count),
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(Heatmap {
            meeting_id: meeting.id,
            dates: grid.dates,
            hours: grid.hours,
            max_count: agg.max_count,
            respondents: responses.len(),
            my_slots,
            rows,
        })
    }
}
