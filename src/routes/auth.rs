// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::meeting::MEETING_ID_PREFIX;
use crate::models::SessionUser;
use crate::services::discord::Prompt;
use crate::services::oauth_state::DEFAULT_DESTINATION;
use crate::AppState;

/// Longest destination accepted by `/authorize`.
const MAX_DESTINATION_LEN: usize = 128;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Map a verified destination onto a URL inside the web app.
///
/// Only `dashboard` and meeting codes are understood; anything else lands on
/// the dashboard, so a destination can never point off-site.
pub fn resolve_destination(app_url: &str, destination: &str) -> String {
    let is_meeting = destination
        .strip_prefix(MEETING_ID_PREFIX)
        .is_some_and(|code| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric()));

    if is_meeting {
        format!("{app_url}/meeting/{destination}")
    } else {
        format!("{app_url}/dashboard?login=success")
    }
}

#[derive(Deserialize)]
pub struct AuthorizeParams {
    /// Where to land after login: `dashboard` or a meeting code.
    #[serde(default)]
    redirect: Option<String>,
}

/// Start OAuth flow - redirect to Discord authorization.
async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeParams>,
) -> Result<Redirect> {
    let destination = params
        .redirect
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_DESTINATION.to_string());

    if destination.len() > MAX_DESTINATION_LEN {
        return Err(AppError::InvalidInput(format!(
            "redirect must be at most {MAX_DESTINATION_LEN} characters"
        )));
    }

    let token = state.state_codec.mint(&destination)?;
    let auth_url = state.discord.authorize_url(&token, Prompt::Consent);

    tracing::info!(destination = %destination, "Starting OAuth flow, redirecting to Discord");

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - verify state, exchange code, set the session cookie.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    // The state is checked before anything else, including provider errors.
    let destination = params
        .state
        .as_deref()
        .and_then(|token| state.state_codec.verify(token))
        .ok_or_else(|| {
            tracing::warn!("OAuth callback with invalid or expired state");
            AppError::InvalidToken
        })?;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Discord");
        let redirect = format!("{}/?login=error", state.config.app_url);
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let token = state.discord.exchange_code(&code).await?;
    let user: SessionUser = state.discord.current_user(&token.access_token).await?.into();

    tracing::info!(user_id = %user.id, username = %user.username, "OAuth successful");

    let jar = state.sessions.issue(jar, &user)?;
    let redirect = resolve_destination(&state.config.app_url, &destination);

    Ok((jar, Redirect::temporary(&redirect)))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Logout - always clears the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (state.sessions.revoke(jar), Json(LogoutResponse { success: true }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeUser {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub avatar_url: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user: Option<MeUser>,
}

/// Current user, or `{"user": null}` without a valid session.
async fn me(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<MeResponse> {
    let user = state.sessions.read(&jar).map(|user| MeUser {
        avatar_url: user.avatar_url(),
        id: user.id,
        username: user.username,
        avatar: user.avatar,
    });

    Json(MeResponse { user })
}
