// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use cinemate::config::Config;
use cinemate::db::FirestoreDb;
use cinemate::error::AppError;
use cinemate::middleware::auth::create_jwt;
use cinemate::routes::create_router;
use cinemate::AppState;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("pro".into()), StatusCode::FORBIDDEN),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::MovieApi("x".into()), StatusCode::BAD_GATEWAY),
        (AppError::Ai("x".into()), StatusCode::BAD_GATEWAY),
        (AppError::Payment("x".into()), StatusCode::BAD_GATEWAY),
        (AppError::CheckoutTimeout("s1".into()), StatusCode::GATEWAY_TIMEOUT),
        (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        assert_eq!(err.into_response().status(), expected);
    }
}

#[tokio::test]
async fn test_database_details_not_leaked() {
    let response = AppError::Database("connection string with secrets".into()).into_response();
    let body = body_json(response).await;

    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_offline_firestore_surfaces_as_database_error() {
    let config = Config::default();
    let token = create_jwt("alice", &config.jwt_signing_key).unwrap();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(FirestoreDb::new_offline()),
        Arc::new(common::FakeMovies),
        Arc::new(common::FakeRecommender),
    ));

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "database_error");
}
