// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord interaction payloads.
//!
//! Discord tags interactions with an integer `type`. The wire shape is parsed
//! into [`RawInteraction`] and then narrowed into the closed [`Interaction`]
//! enum, so handlers match exhaustively instead of probing optional fields.

use serde::Deserialize;
use std::collections::HashMap;

const TYPE_PING: u8 = 1;
const TYPE_APPLICATION_COMMAND: u8 = 2;
const TYPE_MODAL_SUBMIT: u8 = 5;

/// A verified inbound interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Ping,
    Command(CommandInvocation),
    ModalSubmit(ModalSubmission),
    Unknown { kind: u8 },
}

/// Slash command invocation, e.g. `/scheduler meeting`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub name: String,
    /// First-level subcommand, if any
    pub subcommand: Option<String>,
    pub context: InvocationContext,
}

/// Submitted modal with its text inputs flattened by `custom_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalSubmission {
    pub custom_id: String,
    pub fields: HashMap<String, String>,
    pub context: InvocationContext,
}

impl ModalSubmission {
    /// Trimmed value of a text input; empty when missing.
    pub fn field(&self, custom_id: &str) -> &str {
        self.fields.get(custom_id).map(|v| v.trim()).unwrap_or("")
    }
}

/// Who invoked the interaction, and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationContext {
    pub user: Option<Invoker>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoker {
    pub id: String,
    pub display_name: String,
}

impl Interaction {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawInteraction = serde_json::from_slice(body)?;
        Ok(raw.into())
    }
}

// ─── Wire format ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawInteraction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    data: Option<RawData>,
    /// Present for guild invocations
    #[serde(default)]
    member: Option<RawMember>,
    /// Present for DM invocations
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    custom_id: String,
    #[serde(default)]
    components: Vec<RawActionRow>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawActionRow {
    #[serde(default)]
    components: Vec<RawTextInput>,
}

#[derive(Debug, Deserialize)]
struct RawTextInput {
    custom_id: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
}

impl From<RawInteraction> for Interaction {
    fn from(raw: RawInteraction) -> Self {
        let user = raw
            .member
            .and_then(|m| m.user)
            .or(raw.user)
            .map(|u| Invoker {
                display_name: u.global_name.filter(|n| !n.is_empty()).unwrap_or(u.username),
                id: u.id,
            });

        let context = InvocationContext {
            user,
            guild_id: raw.guild_id,
            channel_id: raw.channel_id,
        };
        let data = raw.data.unwrap_or_default();

        match raw.kind {
            TYPE_PING => Interaction::Ping,
            TYPE_APPLICATION_COMMAND => Interaction::Command(CommandInvocation {
                name: data.name,
                subcommand: data.options.into_iter().next().map(|o| o.name),
                context,
            }),
            TYPE_MODAL_SUBMIT => Interaction::ModalSubmit(ModalSubmission {
                custom_id: data.custom_id,
                fields: data
                    .components
                    .into_iter()
                    .flat_map(|row| row.components)
                    .map(|input| (input.custom_id, input.value))
                    .collect(),
                context,
            }),
            kind => Interaction::Unknown { kind },
        }
    }
}
