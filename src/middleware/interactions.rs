// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord interaction signature middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Largest interaction body we are willing to buffer.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Reject any request whose body is not signed by the application key.
///
/// The body has to be buffered to check the signature, so the handler gets
/// a rebuilt request carrying the same bytes.
pub async fn require_signed_interaction(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let (Some(signature), Some(timestamp)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER))
    else {
        tracing::warn!("Interaction rejected: missing signature headers");
        return Err(AppError::UpstreamUnverified);
    };

    let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::UpstreamUnverified)?;

    if !state
        .interaction_verifier
        .verify(&bytes, &signature, &timestamp)
    {
        tracing::warn!("Interaction rejected: bad signature");
        return Err(AppError::UpstreamUnverified);
    }

    Ok(next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await)
}
