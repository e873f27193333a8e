// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in user identity.

use serde::{Deserialize, Serialize};

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Identity carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Discord user ID (snowflake)
    pub id: String,
    /// Global display name, or username when none is set
    pub username: String,
    /// Discord avatar hash
    pub avatar: Option<String>,
}

impl SessionUser {
    pub fn avatar_url(&self) -> String {
        avatar_url(&self.id, self.avatar.as_deref())
    }
}

/// Build the CDN URL for a user's avatar.
///
/// Animated hashes (`a_` prefix) are served as GIF. Users without a custom
/// avatar get one of the six default avatars, picked by `(id >> 22) % 6`.
pub fn avatar_url(user_id: &str, avatar_hash: Option<&str>) -> String {
    match avatar_hash {
        Some(hash) => {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            format!("{CDN_BASE}/avatars/{user_id}/{hash}.{ext}")
        }
        None => {
            let index = user_id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0);
            format!("{CDN_BASE}/embed/avatars/{index}.png")
        }
    }
}
