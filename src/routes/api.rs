// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the user's own profile and library.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    LibraryItem, LibraryStats, MediaType, RatingChange, RatingRecord, SubscriptionTier, User,
};
use crate::services::library::MAX_USER_RATING;
use crate::services::{CollectionFilter, CollectionSort};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route(
            "/api/ratings/{media_id}",
            get(get_rating).put(update_rating).delete(delete_rating),
        )
        .route("/api/collection", get(get_collection))
        .route("/api/watchlist", get(get_watchlist))
        .route("/api/library/stats", get(get_library_stats))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub uid: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub is_pro: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            is_pro: user.subscription == SubscriptionTier::Pro,
            uid: user.uid,
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
        }
    }
}

/// Profile fields the client may set. The subscription tier is not one.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;

    Ok(Json(profile.into()))
}

/// Create or update the current user's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;

    // Fetch-modify-write to preserve subscription and creation time
    let profile = match state.db.get_user(&user.uid).await? {
        Some(mut existing) => {
            existing.display_name = req.display_name;
            existing.email = req.email;
            existing.photo_url = req.photo_url;
            existing
        }
        None => {
            tracing::info!(uid = %user.uid, "Creating user profile");
            User {
                uid: user.uid.clone(),
                display_name: req.display_name,
                email: req.email,
                photo_url: req.photo_url,
                subscription: SubscriptionTier::Free,
                created_at: chrono::Utc::now(),
            }
        }
    };

    state.db.upsert_user(&profile).await?;
    Ok(Json(profile.into()))
}

// ─── Ratings ─────────────────────────────────────────────────

/// Partial update of one rating record. Absent fields keep their value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingRequest {
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f64>,
    pub watched: Option<bool>,
    pub watchlist: Option<bool>,
    pub is_private: Option<bool>,
    pub media_type: Option<MediaType>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateRatingRequest> for RatingChange {
    fn from(req: UpdateRatingRequest) -> Self {
        Self {
            rating: req.rating,
            watched: req.watched,
            watchlist: req.watchlist,
            is_private: req.is_private,
            media_type: req.media_type,
            notes: req.notes,
        }
    }
}

async fn get_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(media_id): Path<u64>,
) -> Result<Json<RatingRecord>> {
    let record = state
        .library
        .get_rating(&user.uid, media_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No rating for {}", media_id)))?;
    Ok(Json(record))
}

async fn update_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(media_id): Path<u64>,
    Json(req): Json<UpdateRatingRequest>,
) -> Result<Json<RatingRecord>> {
    req.validate()?;
    let record = state
        .library
        .update_rating(&user.uid, media_id, &req.into())
        .await?;
    Ok(Json(record))
}

async fn delete_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(media_id): Path<u64>,
) -> Result<StatusCode> {
    if state.library.delete_rating(&user.uid, media_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No rating for {}", media_id)))
    }
}

// ─── Library ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    /// Lower bound on the user's rating (inclusive)
    pub min_rating: Option<f64>,
    /// Upper bound on the user's rating (inclusive)
    pub max_rating: Option<f64>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    /// Comma-separated genre names
    pub genres: Option<String>,
    pub media_type: Option<MediaType>,
    /// Free-text search over title and synopsis
    pub q: Option<String>,
    #[serde(default)]
    pub sort: CollectionSort,
}

impl CollectionQuery {
    /// Build the filter. A rating range needs at least one bound; a missing
    /// bound is open on that side.
    pub fn to_filter(&self) -> Result<CollectionFilter> {
        let rating_range = match (self.min_rating, self.max_rating) {
            (None, None) => None,
            (low, high) => {
                let low = low.unwrap_or(0.0);
                let high = high.unwrap_or(MAX_USER_RATING);
                if low > high {
                    return Err(AppError::BadRequest(
                        "min_rating must not exceed max_rating".to_string(),
                    ));
                }
                Some((low, high))
            }
        };

        if let (Some(start), Some(end)) = (self.year_start, self.year_end) {
            if start > end {
                return Err(AppError::BadRequest(
                    "year_start must not exceed year_end".to_string(),
                ));
            }
        }

        let genres = self
            .genres
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(CollectionFilter {
            rating_range,
            year_start: self.year_start,
            year_end: self.year_end,
            genres,
            media_type: self.media_type,
            text: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Serialize)]
pub struct LibraryResponse {
    pub items: Vec<LibraryItem>,
    pub total: usize,
}

impl From<Vec<LibraryItem>> for LibraryResponse {
    fn from(items: Vec<LibraryItem>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Get the user's watched collection with optional filtering.
async fn get_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CollectionQuery>,
) -> Result<Json<LibraryResponse>> {
    tracing::debug!(uid = %user.uid, ?params, "Fetching collection");

    let filter = params.to_filter()?;
    let items = state
        .library
        .collection(&user.uid, &filter, params.sort)
        .await?;
    Ok(Json(items.into()))
}

async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LibraryResponse>> {
    let items = state.library.watchlist(&user.uid).await?;
    Ok(Json(items.into()))
}

async fn get_library_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LibraryStats>> {
    Ok(Json(state.library.stats(&user.uid).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_query_builds_filter() {
        let query = CollectionQuery {
            min_rating: Some(3.0),
            year_start: Some(1990),
            genres: Some("Drama, ,Sci-Fi".to_string()),
            q: Some("  matrix ".to_string()),
            ..Default::default()
        };

        let filter = query.to_filter().unwrap();
        assert_eq!(filter.rating_range, Some((3.0, MAX_USER_RATING)));
        assert_eq!(filter.year_start, Some(1990));
        assert_eq!(filter.year_end, None);
        assert_eq!(filter.genres, vec!["Drama", "Sci-Fi"]);
        assert_eq!(filter.text.as_deref(), Some("matrix"));
    }

    #[test]
    fn test_collection_query_empty_is_unfiltered() {
        let filter = CollectionQuery::default().to_filter().unwrap();
        assert_eq!(filter, CollectionFilter::default());
    }

    #[test]
    fn test_collection_query_rejects_inverted_ranges() {
        let ratings = CollectionQuery {
            min_rating: Some(8.0),
            max_rating: Some(2.0),
            ..Default::default()
        };
        assert!(matches!(ratings.to_filter(), Err(AppError::BadRequest(_))));

        let years = CollectionQuery {
            year_start: Some(2020),
            year_end: Some(1990),
            ..Default::default()
        };
        assert!(matches!(years.to_filter(), Err(AppError::BadRequest(_))));
    }
}
