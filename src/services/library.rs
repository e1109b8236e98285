// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! A user's own library: ratings, the watched collection and the watchlist.

use crate::db::{RatingQuery, Store};
use crate::error::{AppError, Result};
use crate::models::{LibraryItem, LibraryStats, RatingChange, RatingRecord};
use crate::services::collection::{self, CollectionFilter, CollectionSort};
use crate::services::MovieLookup;
use futures_util::future::join_all;
use std::sync::Arc;

/// Highest accepted user rating. Some clients rate out of 5 and some out
/// of 10; both fit and values are stored as given.
pub const MAX_USER_RATING: f64 = 10.0;

#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn Store>,
    movies: Arc<dyn MovieLookup>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn Store>, movies: Arc<dyn MovieLookup>) -> Self {
        Self { store, movies }
    }

    pub async fn get_rating(&self, uid: &str, media_id: u64) -> Result<Option<RatingRecord>> {
        self.store.get_rating(uid, media_id).await
    }

    /// Merge a change into the user's record for `media_id`.
    pub async fn update_rating(
        &self,
        uid: &str,
        media_id: u64,
        change: &RatingChange,
    ) -> Result<RatingRecord> {
        if let Some(rating) = change.rating {
            if !(0.0..=MAX_USER_RATING).contains(&rating) {
                return Err(AppError::BadRequest(format!(
                    "Rating must be between 0 and {}",
                    MAX_USER_RATING
                )));
            }
        }

        let record = self
            .store
            .update_rating_atomic(uid, media_id, change, chrono::Utc::now())
            .await?;

        tracing::info!(
            uid,
            media_id,
            rating = record.rating,
            watched = record.watched,
            watchlist = record.watchlist,
            "Rating updated"
        );
        Ok(record)
    }

    /// Returns `false` if the user had no record for `media_id`.
    pub async fn delete_rating(&self, uid: &str, media_id: u64) -> Result<bool> {
        let deleted = self
            .store
            .delete_rating_atomic(uid, media_id, chrono::Utc::now())
            .await?;
        if deleted {
            tracing::info!(uid, media_id, "Rating deleted");
        }
        Ok(deleted)
    }

    /// Watched items, enriched, filtered and sorted.
    pub async fn collection(
        &self,
        uid: &str,
        filter: &CollectionFilter,
        sort: CollectionSort,
    ) -> Result<Vec<LibraryItem>> {
        let records = self.store.query_ratings(uid, &RatingQuery::watched()).await?;
        let items = self.enrich(records).await;
        Ok(collection::apply(items, filter, sort))
    }

    /// Watchlisted items, newest first.
    pub async fn watchlist(&self, uid: &str) -> Result<Vec<LibraryItem>> {
        let records = self
            .store
            .query_ratings(uid, &RatingQuery::watchlist())
            .await?;
        Ok(self.enrich(records).await)
    }

    /// Cached library counts. Rebuilt from the ratings if the aggregate
    /// document does not exist yet.
    pub async fn stats(&self, uid: &str) -> Result<LibraryStats> {
        if let Some(stats) = self.store.get_library_stats(uid).await? {
            return Ok(stats);
        }

        let records = self
            .store
            .query_ratings(uid, &RatingQuery::default())
            .await?;
        let stats = LibraryStats::from_records(&records, chrono::Utc::now());
        self.store.set_library_stats(uid, &stats).await?;

        tracing::info!(
            uid,
            watched = stats.watched_count,
            watchlist = stats.watchlist_count,
            "Rebuilt library stats"
        );
        Ok(stats)
    }

    /// Join records with their movies. Unresolvable movies are dropped.
    async fn enrich(&self, records: Vec<RatingRecord>) -> Vec<LibraryItem> {
        let lookups = records
            .iter()
            .map(|r| self.movies.get_movie(r.media_id, Some(r.media_type)));
        let movies = join_all(lookups).await;

        records
            .into_iter()
            .zip(movies)
            .filter(|(_, movie)| !movie.is_sentinel())
            .map(|(r, movie)| LibraryItem {
                movie,
                user_rating: r.rating,
                watched: r.watched,
                watchlist: r.watchlist,
                is_private: r.is_private,
                notes: r.notes,
                updated_at: r.updated_at,
            })
            .collect()
    }
}
