// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything secret is read once here and then handed to the components
//! that need it at construction time. Nothing below this module touches the
//! process environment.

use std::env;

/// Default Discord REST API base.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Which persistence backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Discord application (client) ID
    pub discord_app_id: String,
    /// OAuth redirect URI registered with Discord (points at `/callback`)
    pub discord_redirect_uri: String,
    /// Discord REST API base URL
    pub discord_api_base: String,
    /// Hex-encoded Ed25519 public key used to verify interactions
    pub discord_public_key: String,
    /// Public URL of the web app (post-login redirects land here)
    pub app_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Discord OAuth client secret
    pub discord_client_secret: String,
    /// HMAC key for the OAuth `state` parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,
    /// JWT signing key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Bot token, only needed for slash command registration
    pub discord_bot_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let discord_client_secret = required("DISCORD_CLIENT_SECRET")?;

        // The client secret doubles as the state key unless one is provided.
        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| discord_client_secret.clone())
            .into_bytes();

        let discord_public_key = required("DISCORD_PUBLIC_KEY")?;
        if hex::decode(&discord_public_key).map(|k| k.len()) != Ok(32) {
            return Err(ConfigError::Invalid(
                "DISCORD_PUBLIC_KEY",
                "expected 64 hex characters".to_string(),
            ));
        }

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(other) => {
                return Err(ConfigError::Invalid(
                    "STORE_BACKEND",
                    format!("unknown backend '{other}'"),
                ))
            }
        };

        Ok(Self {
            discord_app_id: required("DISCORD_APP_ID")?,
            discord_redirect_uri: required("DISCORD_REDIRECT_URI")?,
            discord_api_base: env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| DISCORD_API_BASE.to_string()),
            discord_public_key,
            app_url: env::var("APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            discord_client_secret,
            oauth_state_key,
            session_signing_key: required("SESSION_SIGNING_KEY")?.into_bytes(),
            discord_bot_token: env::var("DISCORD_BOT_TOKEN")
                .ok()
                .map(|v| v.trim().to_string()),
        })
    }

    /// Deterministic config for tests.
    ///
    /// The public key is the RFC 8032 test vector 1 key; tests sign with its seed.
    pub fn test_default() -> Self {
        Self {
            discord_app_id: "123456789012345678".to_string(),
            discord_redirect_uri: "http://localhost:8080/callback".to_string(),
            discord_api_base: DISCORD_API_BASE.to_string(),
            discord_public_key: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
                .to_string(),
            app_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            port: 8080,
            discord_client_secret: "test_client_secret".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            session_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            discord_bot_token: None,
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.app_url.starts_with("https://")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
