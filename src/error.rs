// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Only `NotFound` and `InvalidInput` carry their message to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No session credential, or one that failed verification.
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated, but not allowed to do this.
    #[error("Forbidden")]
    Unauthorized,

    /// OAuth state token was malformed, tampered with, or expired.
    #[error("Invalid or expired state token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Inbound interaction failed signature verification.
    #[error("Interaction signature verification failed")]
    UpstreamUnverified,

    #[error("Discord API error: {0}")]
    IdentityProvider(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "invalid_state",
                Some("Login link expired or invalid, please try again".to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::UpstreamUnverified => {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            AppError::IdentityProvider(msg) => {
                tracing::warn!(error = %msg, "Discord API error");
                (StatusCode::BAD_GATEWAY, "login_failed", None)
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
