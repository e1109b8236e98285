// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friends, friend activity and person-to-person recommendations.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{FeedItem, Friend, MediaType, SentRecommendation};
use crate::services::NewRecommendation;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/friends", get(list_friends).post(add_friend))
        .route("/api/friends/{uid}", delete(remove_friend))
        .route("/api/friends/activity", get(friend_activity))
        .route("/api/recommendations", post(send_recommendation))
        .route("/api/recommendations/incoming", get(incoming_recommendations))
        .route("/api/recommendations/sent", get(sent_recommendations))
}

/// A feed page. Items are newest first.
#[derive(Serialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
    pub page_size: usize,
}

// ─── Friends ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct AddFriendRequest {
    #[validate(length(min = 1, max = 128))]
    pub uid: String,
}

async fn list_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Friend>>> {
    Ok(Json(state.social.list_friends(&user.uid).await?))
}

async fn add_friend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddFriendRequest>,
) -> Result<(StatusCode, Json<Friend>)> {
    req.validate()?;
    let friend = state.social.add_friend(&user.uid, &req.uid).await?;
    Ok((StatusCode::CREATED, Json(friend)))
}

async fn remove_friend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(friend_uid): Path<String>,
) -> Result<StatusCode> {
    state.social.remove_friend(&user.uid, &friend_uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn friend_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FeedResponse>> {
    let items = state.feed.friend_activity(&user.uid).await?;
    Ok(Json(FeedResponse {
        items,
        page_size: state.feed.page_size(),
    }))
}

// ─── Recommendations ─────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SendRecommendationRequest {
    #[validate(length(min = 1, max = 128))]
    pub to: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub media_id: u64,
    #[serde(default)]
    pub media_type: MediaType,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

async fn send_recommendation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SendRecommendationRequest>,
) -> Result<(StatusCode, Json<SentRecommendation>)> {
    req.validate()?;
    let sent = state
        .social
        .send_recommendation(
            &user.uid,
            NewRecommendation {
                to: req.to,
                media_id: req.media_id,
                media_type: req.media_type,
                message: req.message,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

async fn incoming_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FeedResponse>> {
    let items = state.feed.incoming_recommendations(&user.uid).await?;
    Ok(Json(FeedResponse {
        items,
        page_size: state.feed.page_size(),
    }))
}

async fn sent_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FeedResponse>> {
    let items = state.feed.sent_recommendations(&user.uid).await?;
    Ok(Json(FeedResponse {
        items,
        page_size: state.feed.page_size(),
    }))
}
