// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth state tests.
//!
//! These tests verify that destinations survive the mint/verify roundtrip
//! through the `state` parameter, and that `/authorize` embeds a verifiable
//! state in the Discord redirect.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use gdg_scheduler::services::StateCodec;
use tower::ServiceExt;

mod common;

/// Extract and decode the `state` query parameter from a redirect URL.
fn state_param(location: &str) -> String {
    let query = location.split_once('?').map(|(_, q)| q).unwrap_or("");
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("state="))
        .expect("state parameter present");
    urlencoding::decode(raw).unwrap().into_owned()
}

#[test]
fn test_oauth_state_roundtrip_dashboard() {
    let codec = StateCodec::new(b"deployment-secret".to_vec());
    let token = codec.mint("dashboard").unwrap();
    assert_eq!(codec.verify(&token), Some("dashboard".to_string()));
}

#[test]
fn test_oauth_state_roundtrip_meeting() {
    let codec = StateCodec::new(b"deployment-secret".to_vec());
    let token = codec.mint("MTG-M5Z3K1AB").unwrap();
    assert_eq!(codec.verify(&token), Some("MTG-M5Z3K1AB".to_string()));
}

#[test]
fn test_oauth_state_url_safe() {
    let codec = StateCodec::new(b"deployment-secret".to_vec());
    let token = codec.mint("dashboard?x=1&y=/+").unwrap();

    let (payload, tag) = token.rsplit_once('.').unwrap();
    assert!(!payload.contains('+'), "State should not contain '+'");
    assert!(!payload.contains('/'), "State should not contain '/'");
    assert!(!payload.contains('='), "State should not contain '=' padding");
    assert_eq!(tag.len(), 64);
    assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_oauth_state_payload_shape() {
    let codec = StateCodec::new(b"deployment-secret".to_vec());
    let now = Utc::now();
    let token = codec.mint_at("dashboard", now).unwrap();

    let (payload, _) = token.rsplit_once('.').unwrap();
    let json: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

    assert_eq!(json["redirect"], "dashboard");
    // 128-bit nonce, hex encoded
    assert_eq!(json["nonce"].as_str().unwrap().len(), 32);
    assert_eq!(
        json["exp"].as_i64().unwrap(),
        now.timestamp_millis() + 10 * 60 * 1000
    );
}

#[test]
fn test_oauth_state_expiry() {
    let codec = StateCodec::new(b"deployment-secret".to_vec());
    let token = codec
        .mint_at("dashboard", Utc::now() - Duration::minutes(10) - Duration::seconds(1))
        .unwrap();
    assert_eq!(codec.verify(&token), None);

    let fresh = codec
        .mint_at("dashboard", Utc::now() - Duration::minutes(9))
        .unwrap();
    assert!(codec.verify(&fresh).is_some());
}

#[tokio::test]
async fn test_authorize_redirects_with_verifiable_state() {
    let (app, state, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/authorize?redirect=MTG-ABC123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(location.starts_with("https://discord.com/oauth2/authorize?"));
    assert!(location.contains("client_id=123456789012345678"));
    assert!(location.contains("response_type=code"));

    let token = state_param(&location);
    assert_eq!(
        state.state_codec.verify(&token),
        Some("MTG-ABC123".to_string())
    );
}

#[tokio::test]
async fn test_authorize_defaults_to_dashboard() {
    let (app, state, _) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/authorize").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    let token = state_param(location);
    assert_eq!(state.state_codec.verify(&token), Some("dashboard".to_string()));
}

#[tokio::test]
async fn test_authorize_rejects_oversized_destination() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/authorize?redirect={}", "a".repeat(129)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
