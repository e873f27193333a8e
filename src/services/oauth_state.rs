// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` tokens.
//!
//! Format: `base64url(JSON payload) + "." + hex(HMAC-SHA256(encoded payload))`.
//! The payload carries the post-login destination, a random nonce and an
//! expiry in Unix milliseconds. Nothing is stored server side; a token is
//! valid for anyone who holds it until it expires.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How long a minted token stays valid.
pub const STATE_TTL_MS: i64 = 10 * 60 * 1000;

/// Destination used when a token carries none.
pub const DEFAULT_DESTINATION: &str = "dashboard";

#[derive(Serialize, Deserialize)]
struct StatePayload {
    #[serde(default)]
    redirect: Option<String>,
    nonce: String,
    /// Expiry, Unix milliseconds
    exp: i64,
}

/// Mints and verifies signed state tokens under one deployment key.
#[derive(Clone)]
pub struct StateCodec {
    key: Vec<u8>,
    rng: SystemRandom,
}

impl StateCodec {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            rng: SystemRandom::new(),
        }
    }

    /// Mint a token for `destination` that expires [`STATE_TTL_MS`] from now.
    pub fn mint(&self, destination: &str) -> anyhow::Result<String> {
        self.mint_at(destination, Utc::now())
    }

    pub fn mint_at(&self, destination: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
        let mut nonce = [0u8; 16];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| anyhow::anyhow!("Failed to generate state nonce"))?;

        let payload = StatePayload {
            redirect: Some(destination.to_string()),
            nonce: hex::encode(nonce),
            exp: now.timestamp_millis() + STATE_TTL_MS,
        };

        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);
        let tag = hex::encode(self.tag(encoded.as_bytes())?);

        Ok(format!("{encoded}.{tag}"))
    }

    /// Verify a token and return its destination.
    ///
    /// Every failure (bad shape, bad tag, bad payload, expiry) is `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let (encoded, tag_hex) = token.rsplit_once('.')?;

        let presented = hex::decode(tag_hex).ok()?;
        let expected = self.tag(encoded.as_bytes()).ok()?;

        if !tags_match(&presented, &expected) {
            tracing::warn!("OAuth state tag mismatch");
            return None;
        }

        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let payload: StatePayload = serde_json::from_slice(&bytes).ok()?;

        if now.timestamp_millis() > payload.exp {
            tracing::warn!("OAuth state expired");
            return None;
        }

        Some(
            payload
                .redirect
                .unwrap_or_else(|| DEFAULT_DESTINATION.to_string()),
        )
    }

    fn tag(&self, message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
thread_local! {
    static TAG_COMPARISONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Constant-time tag comparison.
///
/// Runs over every byte of equal-length inputs; `ct_eq` returns false on a
/// length mismatch without inspecting contents.
fn tags_match(presented: &[u8], expected: &[u8]) -> bool {
    #[cfg(test)]
    TAG_COMPARISONS.with(|n| n.set(n.get() + 1));
    bool::from(presented.ct_eq(expected))
}
