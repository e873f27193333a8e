// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, signatures, security headers).

pub mod auth;
pub mod interactions;
pub mod security;

pub use auth::{require_auth, SessionKeys};
pub use interactions::require_signed_interaction;
