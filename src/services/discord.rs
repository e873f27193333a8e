// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord API client.
//!
//! Handles:
//! - OAuth2 authorize URLs and code exchange
//! - Fetching the signed-in user
//! - Registering the `/scheduler` slash command

use crate::config::Config;
use crate::error::AppError;
use crate::models::SessionUser;
use serde::Deserialize;
use serde_json::json;

/// Browser-facing authorize page (not part of the REST API base).
pub const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";

/// OAuth scopes requested at login.
pub const SCOPES: &str = "identify guilds";

/// Whether Discord shows the consent screen again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Consent,
    /// Skip the screen for users who already authorized the app
    None,
}

impl Prompt {
    fn as_str(self) -> &'static str {
        match self {
            Prompt::Consent => "consent",
            Prompt::None => "none",
        }
    }
}

/// Discord REST client.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl DiscordClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.discord_api_base.trim_end_matches('/').to_string(),
            app_id: config.discord_app_id.clone(),
            client_secret: config.discord_client_secret.clone(),
            redirect_uri: config.discord_redirect_uri.clone(),
        }
    }

    /// Authorize URL carrying `state` back to our callback.
    pub fn authorize_url(&self, state: &str, prompt: Prompt) -> String {
        format!(
            "{AUTHORIZE_URL}?response_type=code&client_id={}&scope={}&state={}&redirect_uri={}&prompt={}",
            urlencoding::encode(&self.app_id),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
            urlencoding::encode(&self.redirect_uri),
            prompt.as_str(),
        )
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let url = format!("{}/oauth2/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Token exchange failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Fetch the user that owns `access_token`.
    pub async fn current_user(&self, access_token: &str) -> Result<DiscordUser, AppError> {
        let url = format!("{}/users/@me", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        check_response_json(response).await
    }

    /// Overwrite the application's global commands.
    pub async fn register_commands(
        &self,
        bot_token: &str,
        commands: &serde_json::Value,
    ) -> Result<Vec<RegisteredCommand>, AppError> {
        let url = format!("{}/applications/{}/commands", self.base_url, self.app_id);

        let response = self
            .http
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {bot_token}"))
            .json(commands)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!("Discord rate limit hit (429)");
        }
        return Err(AppError::IdentityProvider(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::IdentityProvider(format!("JSON parse error: {}", e)))
}

/// The `/scheduler` command with its `meeting` and `dashboard` subcommands.
pub fn scheduler_commands() -> serde_json::Value {
    // Option type 1 is SUB_COMMAND.
    json!([{
        "name": "scheduler",
        "description": "GDG meeting scheduler",
        "type": 1,
        "options": [
            {
                "type": 1,
                "name": "meeting",
                "description": "Create a new meeting poll"
            },
            {
                "type": 1,
                "name": "dashboard",
                "description": "Open your meeting dashboard"
            }
        ]
    }])
}

/// OAuth2 token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `GET /users/@me` response (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordUser {
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

impl From<DiscordUser> for SessionUser {
    fn from(user: DiscordUser) -> Self {
        Self {
            username: user.display_name().to_string(),
            id: user.id,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredCommand {
    pub id: String,
    pub name: String,
}
