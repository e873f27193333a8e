// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Meetings (one document per meeting, keyed by meeting code)
//! - Meeting responses (one document per (meeting, user), keyed by
//!   [`response_doc_id`])

use super::{collections, response_doc_id, MeetingQuery, MeetingStore, StoreError};
use crate::models::{AvailabilityResponse, Meeting};
use async_trait::async_trait;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation fails with a backend error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Backend("Database not connected (offline mode)".to_string()))
    }

    /// Delete documents by ID in transactional batches.
    async fn batch_delete(&self, collection: &str, doc_ids: &[String]) -> Result<(), StoreError> {
        let client = self.get_client()?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        StoreError::Backend(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                StoreError::Backend(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

fn backend(e: firestore::errors::FirestoreError) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl MeetingStore for FirestoreDb {
    // ─── Meeting Operations ──────────────────────────────────────

    async fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError> {
        let result: Result<(), _> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MEETINGS)
            .document_id(&meeting.id)
            .object(meeting)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                Err(StoreError::AlreadyExists(meeting.id.clone()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEETINGS)
            .obj()
            .one(meeting_id)
            .await
            .map_err(backend)
    }

    async fn list_meetings(&self, query: &MeetingQuery) -> Result<Vec<Meeting>, StoreError> {
        let creator_id = query.creator_id.clone();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEETINGS)
            .filter(move |q| {
                creator_id
                    .as_ref()
                    .and_then(|creator| q.field("creator_id").eq(creator.clone()))
            })
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(query.limit)
            .offset(query.offset)
            .obj()
            .query()
            .await
            .map_err(backend)
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<usize, StoreError> {
        // Responses first, so a failure never leaves orphans behind a
        // deleted parent.
        let responses = self.list_responses(meeting_id).await?;
        let doc_ids: Vec<String> = responses
            .iter()
            .map(|r| response_doc_id(&r.meeting_id, &r.user_id))
            .collect();

        self.batch_delete(collections::MEETING_RESPONSES, &doc_ids)
            .await?;
        tracing::debug!(
            meeting_id,
            count = doc_ids.len(),
            "Deleted meeting responses"
        );

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::MEETINGS)
            .document_id(meeting_id)
            .execute()
            .await
            .map_err(backend)?;

        let deleted = doc_ids.len() + 1;
        tracing::info!(meeting_id, deleted, "Meeting deletion complete");
        Ok(deleted)
    }

    // ─── Response Operations ─────────────────────────────────────

    async fn list_responses(
        &self,
        meeting_id: &str,
    ) -> Result<Vec<AvailabilityResponse>, StoreError> {
        let meeting_id = meeting_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEETING_RESPONSES)
            .filter(move |q| q.for_all([q.field("meeting_id").eq(meeting_id.clone())]))
            .order_by([("user_id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(backend)
    }

    async fn get_response(
        &self,
        meeting_id: &str,
        user_id: &str,
    ) -> Result<Option<AvailabilityResponse>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEETING_RESPONSES)
            .obj()
            .one(&response_doc_id(meeting_id, user_id))
            .await
            .map_err(backend)
    }

    async fn upsert_response(
        &self,
        response: &AvailabilityResponse,
    ) -> Result<AvailabilityResponse, StoreError> {
        // A full-document update replaces every field, so the new slot list
        // never merges with the old one.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MEETING_RESPONSES)
            .document_id(response_doc_id(&response.meeting_id, &response.user_id))
            .object(response)
            .execute()
            .await
            .map_err(backend)?;

        tracing::debug!(
            meeting_id = %response.meeting_id,
            user_id = %response.user_id,
            slots = response.slots.len(),
            "Stored meeting response"
        );

        Ok(response.clone())
    }
}
