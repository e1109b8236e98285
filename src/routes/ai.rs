// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI recommendation routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::AiHistoryEntry;
use crate::services::recommender::RecommendationOutput;
use crate::services::RecommendationInput;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ai/recommend", post(recommend))
        .route("/api/ai/suggestions", post(suggest))
        .route("/api/ai/history", get(history))
}

/// Fields left empty are filled from the user's own data.
async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<RecommendationInput>,
) -> Result<Json<RecommendationOutput>> {
    Ok(Json(state.ai.recommend(&user.uid, input).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SuggestRequest {
    #[validate(length(min = 1, max = 2000))]
    pub preferences: String,
}

async fn suggest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<AiHistoryEntry>> {
    req.validate()?;
    Ok(Json(state.ai.suggest(&user.uid, &req.preferences).await?))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<AiHistoryEntry>>> {
    Ok(Json(state.ai.history(&user.uid).await?))
}
