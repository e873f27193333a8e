// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meeting and availability routes.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::{MeetingQuery, MeetingStore, StoreError};
use crate::error::{AppError, Result};
use crate::models::meeting::{generate_meeting_id, parse_iso_date};
use crate::models::{AvailabilityResponse, DateRange, Meeting, RawSlot, SessionUser};
use crate::services::aggregator::{validate_slots, Heatmap};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;
const MAX_PARTICIPANTS: u32 = 1000;

/// Routes anyone may call.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meetings", get(list_meetings))
        .route("/meetings/{id}", get(get_meeting))
        .route("/meetings/{id}/heatmap", get(get_heatmap))
}

/// Routes behind `require_auth`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meetings", post(create_meeting))
        .route("/meetings/{id}/respond", post(respond))
}

// ─── Creation ────────────────────────────────────────────────

/// Fields of a meeting that the creator chooses.
pub struct MeetingDraft {
    pub name: String,
    pub description: Option<String>,
    pub participants_count: u32,
    pub range: DateRange,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
}

/// Store a new meeting owned by `creator` under a freshly generated code.
pub async fn insert_meeting(
    store: &dyn MeetingStore,
    creator_id: &str,
    creator_name: &str,
    draft: MeetingDraft,
) -> Result<Meeting> {
    let now = Utc::now();
    let mut meeting = Meeting {
        id: generate_meeting_id(now),
        name: draft.name,
        description: draft.description.filter(|d| !d.trim().is_empty()),
        participants_count: draft.participants_count,
        date_range_start: draft.range.start,
        date_range_end: draft.range.end,
        creator_id: creator_id.to_string(),
        creator_name: creator_name.to_string(),
        guild_id: draft.guild_id,
        channel_id: draft.channel_id,
        created_at: format_utc_rfc3339(now),
    };

    // Codes are millisecond-based; on a collision, step forward and retry.
    let mut at = now;
    for _ in 0..3 {
        match store.create_meeting(&meeting).await {
            Ok(()) => {
                tracing::info!(
                    meeting_id = %meeting.id,
                    creator_id,
                    start = %meeting.date_range_start,
                    end = %meeting.date_range_end,
                    "Meeting created"
                );
                return Ok(meeting);
            }
            Err(StoreError::AlreadyExists(id)) => {
                tracing::debug!(meeting_id = %id, "Meeting code collision, retrying");
                at += chrono::Duration::milliseconds(1);
                meeting.id = generate_meeting_id(at);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "Could not allocate a unique meeting code"
    )))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(max = 1000))]
    pub participants_count: u32,
    pub date_range_start: String,
    pub date_range_end: String,
}

/// Create a meeting. The creator is always the session user.
async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<MeetingResponse>)> {
    let req: CreateMeetingRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid request body: {e}")))?;

    req.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name must not be blank".to_string()));
    }

    let start = parse_iso_date(&req.date_range_start).map_err(AppError::InvalidInput)?;
    let end = parse_iso_date(&req.date_range_end).map_err(AppError::InvalidInput)?;
    let range = DateRange::new(start, end).map_err(AppError::InvalidInput)?;

    let meeting = insert_meeting(
        state.store.as_ref(),
        &user.id,
        &user.username,
        MeetingDraft {
            name,
            description: req.description,
            participants_count: req.participants_count.min(MAX_PARTICIPANTS),
            range,
            guild_id: None,
            channel_id: None,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(MeetingResponse { meeting })))
}

// ─── Reads ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListMeetingsParams {
    creator_id: Option<String>,
    // Raw strings: out-of-range or garbage values fall back to defaults
    // instead of failing the request.
    limit: Option<String>,
    offset: Option<String>,
}

fn parse_pagination(limit: Option<&str>, offset: Option<&str>) -> (u32, u32) {
    let limit = limit
        .and_then(|l| l.trim().parse::<i64>().ok())
        .filter(|l| *l >= 1)
        .map(|l| l.min(i64::from(MAX_LIMIT)) as u32)
        .unwrap_or(DEFAULT_LIMIT);

    let offset = offset
        .and_then(|o| o.trim().parse::<i64>().ok())
        .filter(|o| *o >= 0)
        .map(|o| o.min(i64::from(u32::MAX)) as u32)
        .unwrap_or(0);

    (limit, offset)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListMeta {
    /// Meetings in this page
    pub count: usize,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeetingListResponse {
    pub meetings: Vec<Meeting>,
    pub meta: ListMeta,
}

async fn list_meetings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMeetingsParams>,
) -> Result<Json<MeetingListResponse>> {
    let (limit, offset) = parse_pagination(params.limit.as_deref(), params.offset.as_deref());

    let query = MeetingQuery {
        creator_id: params.creator_id.filter(|c| !c.is_empty()),
        limit,
        offset,
    };
    let meetings = state.store.list_meetings(&query).await?;

    Ok(Json(MeetingListResponse {
        meta: ListMeta {
            count: meetings.len(),
            limit,
            offset,
        },
        meetings,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeetingResponse {
    pub meeting: Meeting,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeetingDetailResponse {
    pub meeting: Meeting,
    pub responses: Vec<AvailabilityResponse>,
}

async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MeetingDetailResponse>> {
    let meeting = state
        .store
        .get_meeting(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Meeting {id} not found")))?;
    let responses = state.store.list_responses(&id).await?;

    Ok(Json(MeetingDetailResponse { meeting, responses }))
}

/// Heatmap as seen by the signed-in user, or anonymously without a session.
async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<Heatmap>> {
    let viewer = state.sessions.read(&jar);
    let heatmap = state
        .aggregator
        .heatmap(&id, viewer.as_ref().map(|u| u.id.as_str()))
        .await?;

    Ok(Json(heatmap))
}

// ─── Availability ────────────────────────────────────────────

#[derive(Deserialize)]
struct RespondRequest {
    available_slots: Vec<RawSlot>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RespondResponse {
    pub response: AvailabilityResponse,
}

/// Replace the session user's availability for a meeting.
async fn respond(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<RespondResponse>> {
    let req: RespondRequest = serde_json::from_slice(&body).map_err(|e| {
        AppError::InvalidInput(format!("Expected {{\"available_slots\": [...]}}: {e}"))
    })?;

    let slots = validate_slots(req.available_slots)?;
    let response = state.aggregator.upsert(&id, &user, slots).await?;

    Ok(Json(RespondResponse { response }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        assert_eq!(parse_pagination(None, None), (50, 0));
        assert_eq!(parse_pagination(Some("20"), Some("40")), (20, 40));
        assert_eq!(parse_pagination(Some("500"), None), (100, 0));
        assert_eq!(parse_pagination(Some("0"), Some("-5")), (50, 0));
        assert_eq!(parse_pagination(Some("abc"), Some("xyz")), (50, 0));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateMeetingRequest = serde_json::from_str(
            r#"{"name":"","date_range_start":"2025-01-20","date_range_end":"2025-01-21"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateMeetingRequest = serde_json::from_str(
            r#"{"name":"Sync","participants_count":5000,"date_range_start":"2025-01-20","date_range_end":"2025-01-21"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateMeetingRequest = serde_json::from_str(
            r#"{"name":"Sync","participants_count":8,"date_range_start":"2025-01-20","date_range_end":"2025-01-21"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }
}
