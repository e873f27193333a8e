// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gdg_scheduler::db::StoreError;
use gdg_scheduler::error::AppError;

mod common;

#[tokio::test]
async fn test_client_errors_map_to_status() {
    let cases = [
        (AppError::Unauthenticated, StatusCode::UNAUTHORIZED, "unauthenticated"),
        (AppError::Unauthorized, StatusCode::FORBIDDEN, "forbidden"),
        (AppError::InvalidToken, StatusCode::FORBIDDEN, "invalid_state"),
        (
            AppError::NotFound("Meeting MTG-X not found".to_string()),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
        (
            AppError::InvalidInput("bad hour".to_string()),
            StatusCode::BAD_REQUEST,
            "bad_request",
        ),
    ];

    for (err, status, code) in cases {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        assert_eq!(common::body_json(response).await["error"], code);
    }
}

#[tokio::test]
async fn test_not_found_carries_details() {
    let response = AppError::NotFound("Meeting MTG-X not found".to_string()).into_response();
    let json = common::body_json(response).await;
    assert_eq!(json["details"], "Meeting MTG-X not found");
}

#[tokio::test]
async fn test_provider_failure_hides_upstream_message() {
    let response =
        AppError::IdentityProvider("401 Unauthorized: {\"error\":\"invalid_client\"}".to_string())
            .into_response();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "login_failed");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_internal_errors_are_generic() {
    let response = AppError::Internal(anyhow::anyhow!("rng failure")).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());
}

#[test]
fn test_store_conflict_converts() {
    let err: AppError = StoreError::AlreadyExists("MTG-1".to_string()).into();
    assert!(matches!(err, AppError::Store(StoreError::AlreadyExists(_))));
}
