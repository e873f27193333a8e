// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GDG Scheduler: find a meeting time that works for everyone.
//!
//! This crate provides the backend API: Discord login, the `/scheduler`
//! slash command, and the availability grid with its overlap heatmap.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use anyhow::Context;
use config::Config;
use db::MeetingStore;
use middleware::SessionKeys;
use services::{AvailabilityAggregator, DiscordClient, InteractionVerifier, StateCodec};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn MeetingStore>,
    pub state_codec: StateCodec,
    pub sessions: SessionKeys,
    pub interaction_verifier: InteractionVerifier,
    pub discord: DiscordClient,
    pub aggregator: AvailabilityAggregator,
}

impl AppState {
    /// Wire every component from `config`, handing each its secrets.
    pub fn new(config: Config, store: Arc<dyn MeetingStore>) -> anyhow::Result<Self> {
        let interaction_verifier = InteractionVerifier::from_hex(&config.discord_public_key)
            .context("DISCORD_PUBLIC_KEY is not a valid Ed25519 public key")?;

        Ok(Self {
            state_codec: StateCodec::new(config.oauth_state_key.clone()),
            sessions: SessionKeys::new(&config.session_signing_key, config.secure_cookies()),
            interaction_verifier,
            discord: DiscordClient::new(&config),
            aggregator: AvailabilityAggregator::new(store.clone()),
            store,
            config,
        })
    }
}
