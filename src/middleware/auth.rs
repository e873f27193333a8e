// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and the authentication middleware.
//!
//! The session is an HS256 JWT in an HttpOnly cookie. The server keeps no
//! session table; the signature is what makes the identity trustworthy.

use crate::error::AppError;
use crate::models::SessionUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "gdg_session";

/// Session lifetime (7 days).
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Discord user ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Discord avatar hash
    #[serde(default)]
    pub avatar: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Issues, reads and revokes session cookies.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure: bool,
}

impl SessionKeys {
    pub fn new(signing_key: &[u8], secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
            secure,
        }
    }

    /// Create a signed session token for `user`.
    pub fn create_token(&self, user: &SessionUser) -> anyhow::Result<String> {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = Claims {
            sub: user.id.clone(),
            name: user.username.clone(),
            avatar: user.avatar.clone(),
            iat: now as usize,
            exp: (now + SESSION_TTL_SECS) as usize,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Decode a session token. Anything malformed, forged or expired is `None`.
    pub fn decode_token(&self, token: &str) -> Option<SessionUser> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;

        if data.claims.sub.is_empty() {
            return None;
        }

        Some(SessionUser {
            id: data.claims.sub,
            username: data.claims.name,
            avatar: data.claims.avatar,
        })
    }

    /// Add the session cookie for `user` to the jar.
    pub fn issue(&self, jar: CookieJar, user: &SessionUser) -> anyhow::Result<CookieJar> {
        let token = self.create_token(user)?;
        Ok(jar.add(self.cookie(
            token,
            time::Duration::seconds(SESSION_TTL_SECS as i64),
        )))
    }

    pub fn read(&self, jar: &CookieJar) -> Option<SessionUser> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.decode_token(cookie.value()))
    }

    /// Replace the session cookie with an immediately expiring one.
    ///
    /// The removal cookie is always emitted, with the same attributes as the
    /// one `issue` sets, whether or not a session was present.
    pub fn revoke(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.cookie(String::new(), time::Duration::ZERO))
    }

    pub fn require_identity(&self, jar: &CookieJar) -> Result<SessionUser, AppError> {
        self.read(jar).ok_or(AppError::Unauthenticated)
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

/// Middleware that requires a valid session cookie.
///
/// Inserts the [`SessionUser`] as a request extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.sessions.require_identity(&jar)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: "80351110224678912".to_string(),
            username: "Ada".to_string(),
            avatar: Some("a_deadbeef".to_string()),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let keys = SessionKeys::new(b"test_jwt_key_32_bytes_minimum!!", false);
        let token = keys.create_token(&user()).unwrap();
        assert_eq!(keys.decode_token(&token), Some(user()));
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let token = SessionKeys::new(b"some_other_signing_key_entirely", false)
            .create_token(&user())
            .unwrap();
        let keys = SessionKeys::new(b"test_jwt_key_32_bytes_minimum!!", false);
        assert_eq!(keys.decode_token(&token), None);
        assert_eq!(keys.decode_token("garbage"), None);
    }

    #[test]
    fn test_issue_sets_cookie_attributes() {
        let keys = SessionKeys::new(b"test_jwt_key_32_bytes_minimum!!", true);
        let jar = keys.issue(CookieJar::new(), &user()).unwrap();
        let cookie = jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_TTL_SECS as i64))
        );
        assert_eq!(keys.read(&jar), Some(user()));
    }

    #[test]
    fn test_revoke_clears_identity() {
        let keys = SessionKeys::new(b"test_jwt_key_32_bytes_minimum!!", false);
        let jar = keys.issue(CookieJar::new(), &user()).unwrap();
        let jar = keys.revoke(jar);
        assert_eq!(keys.read(&jar), None);
        assert!(matches!(
            keys.require_identity(&jar),
            Err(AppError::Unauthenticated)
        ));
    }
}
