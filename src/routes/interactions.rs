// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord interactions endpoint.
//!
//! Requests only reach [`handle_interaction`] after
//! [`require_signed_interaction`] has checked their Ed25519 signature.

use axum::{
    body::Bytes, extract::State, middleware, routing::post, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::require_signed_interaction;
use crate::models::interaction::{CommandInvocation, Interaction, ModalSubmission};
use crate::models::DateRange;
use crate::routes::meetings::{insert_meeting, MeetingDraft};
use crate::services::discord::Prompt;
use crate::services::oauth_state::DEFAULT_DESTINATION;
use crate::AppState;

pub const COMMAND_NAME: &str = "scheduler";
pub const MEETING_MODAL_ID: &str = "scheduler_meeting_modal";

// Interaction response types
const PONG: u8 = 1;
const CHANNEL_MESSAGE: u8 = 4;
const MODAL: u8 = 9;

/// Message flag: only the invoking user sees the reply.
const EPHEMERAL: u64 = 64;

const MAX_NAME_LEN: usize = 100;
const MAX_PARTICIPANTS: u32 = 1000;

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/interactions", post(handle_interaction))
        .route_layer(middleware::from_fn_with_state(
            state,
            require_signed_interaction,
        ))
}

async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>> {
    let interaction = Interaction::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Malformed interaction: {e}")))?;

    match interaction {
        Interaction::Ping => Ok(Json(json!({ "type": PONG }))),
        Interaction::Command(command) => handle_command(&state, command).map(Json),
        Interaction::ModalSubmit(modal) => handle_modal_submit(&state, modal).await.map(Json),
        Interaction::Unknown { kind } => {
            tracing::warn!(kind, "Unknown interaction type");
            Err(AppError::InvalidInput(format!(
                "Unknown interaction type {kind}"
            )))
        }
    }
}

fn message(content: impl Into<String>) -> Value {
    json!({ "type": CHANNEL_MESSAGE, "data": { "content": content.into() } })
}

fn ephemeral(content: impl Into<String>) -> Value {
    json!({
        "type": CHANNEL_MESSAGE,
        "data": { "content": content.into(), "flags": EPHEMERAL }
    })
}

fn link_button(label: &str, url: &str) -> Value {
    // Component type 1 is an action row; type 2 style 5 is a link button.
    json!([{
        "type": 1,
        "components": [{ "type": 2, "style": 5, "label": label, "url": url }]
    }])
}

fn handle_command(state: &AppState, command: CommandInvocation) -> Result<Value> {
    if command.name != COMMAND_NAME {
        return Ok(message(format!("Unknown command: {}", command.name)));
    }

    tracing::debug!(
        subcommand = ?command.subcommand,
        user_id = ?command.context.user.as_ref().map(|u| &u.id),
        "Slash command"
    );

    match command.subcommand.as_deref() {
        Some("meeting") => Ok(meeting_modal()),
        Some("dashboard") => dashboard_reply(state),
        other => Ok(message(format!(
            "Unknown subcommand: {}",
            other.unwrap_or("(none)")
        ))),
    }
}

fn meeting_modal() -> Value {
    // Text input style 1 is single line, 2 is paragraph.
    let input = |id: &str, label: &str, style: u8, placeholder: &str, required: bool| {
        json!({
            "type": 1,
            "components": [{
                "type": 4,
                "custom_id": id,
                "label": label,
                "style": style,
                "placeholder": placeholder,
                "required": required
            }]
        })
    };

    json!({
        "type": MODAL,
        "data": {
            "custom_id": MEETING_MODAL_ID,
            "title": "Create a meeting poll",
            "components": [
                input("meeting_name", "Meeting name", 1, "e.g. GDG weekly sync", true),
                input("meeting_participants", "Expected participants", 1, "e.g. 10", true),
                input("meeting_date_range", "Date range (start ~ end)", 1, "e.g. 2025-01-20 ~ 2025-01-25", true),
                input("meeting_description", "Description (optional)", 2, "Agenda or notes...", false)
            ]
        }
    })
}

fn dashboard_reply(state: &AppState) -> Result<Value> {
    let token = state.state_codec.mint(DEFAULT_DESTINATION)?;
    let url = state.discord.authorize_url(&token, Prompt::None);

    Ok(json!({
        "type": CHANNEL_MESSAGE,
        "data": {
            "embeds": [{
                "title": "GDG Scheduler dashboard",
                "description": "Sign in with Discord to see your meetings and current polls.",
                "color": 0x5865f2
            }],
            "components": link_button("Open dashboard", &url),
            "flags": EPHEMERAL
        }
    }))
}

async fn handle_modal_submit(state: &AppState, modal: ModalSubmission) -> Result<Value> {
    if modal.custom_id != MEETING_MODAL_ID {
        return Ok(message("Unknown modal submission"));
    }

    let name = modal.field("meeting_name");
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Ok(ephemeral(format!(
            "Meeting name must be 1 to {MAX_NAME_LEN} characters."
        )));
    }

    let date_input = modal.field("meeting_date_range");
    let range = match DateRange::parse(date_input) {
        Ok(range) => range,
        Err(reason) => {
            return Ok(ephemeral(format!(
                "{reason}. Use `YYYY-MM-DD ~ YYYY-MM-DD`, e.g. 2025-01-20 ~ 2025-01-25."
            )))
        }
    };

    let participants = modal
        .field("meeting_participants")
        .parse::<u32>()
        .unwrap_or(0)
        .min(MAX_PARTICIPANTS);

    let (creator_id, creator_name) = modal
        .context
        .user
        .as_ref()
        .map(|u| (u.id.as_str(), u.display_name.as_str()))
        .unwrap_or(("unknown", "unknown"));

    let draft = MeetingDraft {
        name: name.to_string(),
        description: Some(modal.field("meeting_description").to_string()),
        participants_count: participants,
        range,
        guild_id: modal.context.guild_id.clone(),
        channel_id: modal.context.channel_id.clone(),
    };

    let meeting =
        match insert_meeting(state.store.as_ref(), creator_id, creator_name, draft).await {
            Ok(meeting) => meeting,
            Err(e) => {
                tracing::error!(error = %e, "Failed to store meeting from modal");
                return Ok(ephemeral(
                    "Could not save the meeting. Please try again in a moment.",
                ));
            }
        };

    let token = state.state_codec.mint(&meeting.id)?;
    let url = state.discord.authorize_url(&token, Prompt::None);
    let dates = format!("{} ~ {}", meeting.date_range_start, meeting.date_range_end);

    Ok(json!({
        "type": CHANNEL_MESSAGE,
        "data": {
            "embeds": [{
                "title": meeting.name,
                "description": meeting.description.as_deref().unwrap_or("No description"),
                "fields": [
                    { "name": "Meeting ID", "value": meeting.id, "inline": true },
                    { "name": "Participants", "value": participants.to_string(), "inline": true },
                    { "name": "Dates", "value": dates, "inline": false },
                    { "name": "Organizer", "value": format!("<@{creator_id}>"), "inline": true }
                ],
                "color": 0x00d26a,
                "timestamp": meeting.created_at,
                "footer": { "text": "Use the button below to mark when you're free" }
            }],
            "components": link_button("Mark availability", &url)
        }
    }))
}
