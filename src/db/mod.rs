// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer.
//!
//! Handlers only see [`MeetingStore`]. Firestore is the production backend;
//! the in-memory backend serves local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{AvailabilityResponse, Meeting};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const MEETINGS: &str = "meetings";
    /// One document per (meeting, user)
    pub const MEETING_RESPONSES: &str = "meeting_responses";
}

/// Document ID of a response row.
///
/// Both halves are URL-encoded with `_` escaped as well (the encoder leaves
/// it alone), so the separator only ever appears once and the ID alone makes
/// `(meeting_id, user_id)` unique.
pub fn response_doc_id(meeting_id: &str, user_id: &str) -> String {
    format!("{}_{}", encode_key_part(meeting_id), encode_key_part(user_id))
}

fn encode_key_part(part: &str) -> String {
    urlencoding::encode(part).replace('_', "%5F")
}

/// Filters for listing meetings.
#[derive(Debug, Clone, Default)]
pub struct MeetingQuery {
    pub creator_id: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// CRUD over the `meetings` and `meeting_responses` relations.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Insert a new meeting. Fails with `AlreadyExists` on an ID collision.
    async fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError>;

    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>, StoreError>;

    /// List meetings, newest first.
    async fn list_meetings(&self, query: &MeetingQuery) -> Result<Vec<Meeting>, StoreError>;

    /// Delete a meeting and every response that belongs to it.
    ///
    /// Returns the number of documents deleted.
    async fn delete_meeting(&self, meeting_id: &str) -> Result<usize, StoreError>;

    async fn list_responses(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<AvailabilityResponse>, StoreError>;

    async fn get_response(
        &self,
        meeting_id: &str,
        user_id: &str,
    ) -> Result<Option<AvailabilityResponse>, StoreError>;

    /// Insert or fully replace the response for `(meeting_id, user_id)`.
    ///
    /// This is a single-document write; concurrent writes for the same key
    /// are last-write-wins.
    async fn upsert_response(
        &self,
        response: &AvailabilityResponse,
    ) -> Result<AvailabilityResponse, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_doc_id_is_injective_on_separator() {
        assert_ne!(response_doc_id("a_b", "c"), response_doc_id("a", "b_c"));
        assert_eq!(response_doc_id("MTG-1", "42"), "MTG-1_42");
    }

    #[test]
    fn test_response_doc_id_escapes_underscore_and_percent() {
        assert_eq!(response_doc_id("a_b", "c"), "a%5Fb_c");
        assert_eq!(response_doc_id("a", "b_c"), "a_b%5Fc");
        assert_ne!(response_doc_id("a%5Fb", "c"), response_doc_id("a_b", "c"));
    }
}
