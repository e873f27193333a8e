// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backed by `DashMap`.
//!
//! Each map entry is replaced under its shard lock, which gives the same
//! single-row atomicity the Firestore backend gets from document writes.

use super::{response_doc_id, MeetingQuery, MeetingStore, StoreError};
use crate::models::{AvailabilityResponse, Meeting};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory store for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    meetings: DashMap<String, Meeting>,
    responses: DashMap<String, AvailabilityResponse>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl MeetingStore for MemoryStore {
    async fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError> {
        match self.meetings.entry(meeting.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(meeting.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(meeting.clone());
                self.record_write();
                Ok(())
            }
        }
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>, StoreError> {
        Ok(self.meetings.get(meeting_id).map(|m| m.value().clone()))
    }

    async fn list_meetings(&self, query: &MeetingQuery) -> Result<Vec<Meeting>, StoreError> {
        let mut meetings: Vec<Meeting> = self
            .meetings
            .iter()
            .filter(|m| {
                query
                    .creator_id
                    .as_deref()
                    .map_or(true, |creator| m.creator_id == creator)
            })
            .map(|m| m.value().clone())
            .collect();

        // RFC 3339 strings in UTC sort chronologically.
        meetings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(meetings
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<usize, StoreError> {
        let before = self.responses.len();
        self.responses.retain(|_, r| r.meeting_id != meeting_id);
        let mut deleted = before.saturating_sub(self.responses.len());

        if self.meetings.remove(meeting_id).is_some() {
            deleted += 1;
        }
        if deleted > 0 {
            self.record_write();
        }

        tracing::debug!(meeting_id, deleted, "Deleted meeting from memory store");
        Ok(deleted)
    }

    async fn list_responses(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<AvailabilityResponse>, StoreError> {
        let mut responses: Vec<AvailabilityResponse> = self
            .responses
            .iter()
            .filter(|r| r.meeting_id == meeting_id)
            .map(|r| r.value().clone())
            .collect();
        responses.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(responses)
    }

    async fn get_response(
        &self,
        meeting_id: &str,
        user_id: &str,
    ) -> Result<Option<AvailabilityResponse>, StoreError> {
        Ok(self
            .responses
            .get(&response_doc_id(meeting_id, user_id))
            .map(|r| r.value().clone()))
    }

    async fn upsert_response(
        &self,
        response: &AvailabilityResponse,
    ) -> Result<AvailabilityResponse, StoreError> {
        let key = response_doc_id(&response.meeting_id, &response.user_id);
        self.responses.insert(key, response.clone());
        self.record_write();
        Ok(response.clone())
    }
}
