// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use gdg_scheduler::config::Config;
use gdg_scheduler::db::{FirestoreDb, MeetingStore, MemoryStore};
use gdg_scheduler::models::{Meeting, SessionUser};
use gdg_scheduler::routes::create_router;
use gdg_scheduler::AppState;
use ring::signature::Ed25519KeyPair;
use std::sync::Arc;

/// RFC 8032 test vector 1 seed; its public key is in `Config::test_default`.
#[allow(dead_code)]
pub const TEST_SIGNING_SEED: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over a fresh in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone()).expect("test state"));
    (create_router(state.clone()), state, store)
}

#[allow(dead_code)]
pub fn test_user(id: &str) -> SessionUser {
    SessionUser {
        id: id.to_string(),
        username: format!("user-{id}"),
        avatar: None,
    }
}

/// `Cookie` header value carrying a valid session for `user`.
#[allow(dead_code)]
pub fn session_cookie(state: &AppState, user: &SessionUser) -> String {
    let token = state
        .sessions
        .create_token(user)
        .expect("Failed to create session token");
    format!("gdg_session={token}")
}

#[allow(dead_code)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

#[allow(dead_code)]
pub fn test_meeting(id: &str, start: &str, end: &str) -> Meeting {
    Meeting {
        id: id.to_string(),
        name: "GDG weekly sync".to_string(),
        description: Some("Agenda TBD".to_string()),
        participants_count: 10,
        date_range_start: date(start),
        date_range_end: date(end),
        creator_id: "1000".to_string(),
        creator_name: "organizer".to_string(),
        guild_id: Some("guild-1".to_string()),
        channel_id: Some("channel-1".to_string()),
        created_at: "2025-01-10T12:00:00Z".to_string(),
    }
}

#[allow(dead_code)]
pub async fn seed_meeting(store: &MemoryStore, id: &str, start: &str, end: &str) -> Meeting {
    let meeting = test_meeting(id, start, end);
    store
        .create_meeting(&meeting)
        .await
        .expect("Failed to seed meeting");
    meeting
}

/// Hex Ed25519 signature over `timestamp || body` with the given seed.
#[allow(dead_code)]
pub fn sign_with_seed(seed_hex: &str, timestamp: &str, body: &str) -> String {
    let seed = hex::decode(seed_hex).expect("valid seed hex");
    let keypair = Ed25519KeyPair::from_seed_unchecked(&seed).expect("valid seed");
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body.as_bytes());
    hex::encode(keypair.sign(&message).as_ref())
}

/// A `POST /interactions` request signed with the configured key.
#[allow(dead_code)]
pub fn signed_interaction(body: &str) -> Request<Body> {
    let timestamp = "1737331200";
    let signature = sign_with_seed(TEST_SIGNING_SEED, timestamp, body);
    Request::builder()
        .method("POST")
        .uri("/interactions")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Signature-Ed25519", signature)
        .header("X-Signature-Timestamp", timestamp)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
