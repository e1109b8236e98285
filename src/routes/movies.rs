// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Movie discovery routes. Lookups never fail; unknown titles come back
//! as the "Unknown" placeholder.

use crate::error::{AppError, Result};
use crate::models::{MediaType, Movie};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const MAX_QUERY_LEN: usize = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/movies/search", get(search))
        .route("/api/movies/popular", get(popular))
        .route("/api/movies/{id}", get(get_movie))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Movie>>> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("Missing search query 'q'".to_string()));
    }
    if q.chars().count() > MAX_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "Search query longer than {} characters",
            MAX_QUERY_LEN
        )));
    }

    Ok(Json(state.movies.search(q).await))
}

async fn popular(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(state.movies.popular().await)
}

#[derive(Deserialize)]
struct DetailsQuery {
    #[serde(rename = "type")]
    media_type: Option<MediaType>,
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(params): Query<DetailsQuery>,
) -> Json<Movie> {
    Json(state.movies.get_movie(id, params.media_type).await)
}
