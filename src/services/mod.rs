// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod discord;
pub mod oauth_state;
pub mod signature;

pub use aggregator::AvailabilityAggregator;
pub use discord::DiscordClient;
pub use oauth_state::StateCodec;
pub use signature::InteractionVerifier;
