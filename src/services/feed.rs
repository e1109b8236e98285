// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed aggregation for friend activity and recommendations.
//!
//! Every feed follows the same steps:
//! 1. Read lightweight reference records (fan-out per friend for activity)
//! 2. Merge, sort newest first, truncate to the page size
//! 3. Resolve each surviving media ID through the movie lookup, concurrently
//! 4. Drop items whose lookup resolved to the "Unknown" sentinel
//!
//! Truncation happens before enrichment, so a feed can come back shorter
//! than the page size even when more qualifying records exist.

use crate::db::{RatingQuery, Store};
use crate::error::Result;
use crate::models::{FeedItem, FeedRef, Friend, Participant};
use crate::services::MovieLookup;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Most recent watched records read from each friend.
pub const PER_FRIEND_LIMIT: u32 = 10;

/// Builds display-ready feeds.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn Store>,
    movies: Arc<dyn MovieLookup>,
    page_size: usize,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>, movies: Arc<dyn MovieLookup>, page_size: usize) -> Self {
        Self {
            store,
            movies,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// What the user's friends have watched recently.
    ///
    /// Reading the friend list is the primary query and its failure
    /// propagates. A failed read of one friend's ratings is logged and that
    /// friend contributes nothing.
    pub async fn friend_activity(&self, uid: &str) -> Result<Vec<FeedItem>> {
        let friends = self.store.list_friends(uid).await?;

        let batches = join_all(friends.iter().map(|friend| self.friend_refs(friend))).await;
        let refs = merge_feed_refs(batches, self.page_size);

        let items = enrich(self.movies.as_ref(), refs).await;
        tracing::debug!(
            uid,
            friends = friends.len(),
            items = items.len(),
            "Built friend activity feed"
        );
        Ok(items)
    }

    async fn friend_refs(&self, friend: &Friend) -> Vec<FeedRef> {
        let query = RatingQuery::friend_visible(PER_FRIEND_LIMIT);
        match self.store.query_ratings(&friend.uid, &query).await {
            Ok(records) => records
                .into_iter()
                // The query already filters these; keep the guarantee local.
                .filter(|r| r.is_visible_to_friends())
                .map(|r| FeedRef {
                    participant: Participant::from(friend),
                    media_id: r.media_id,
                    media_type: r.media_type,
                    timestamp: r.updated_at,
                    rating: (r.rating > 0.0).then_some(r.rating),
                    note: r.notes,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(friend = %friend.uid, error = %e, "Failed to read friend ratings");
                Vec::new()
            }
        }
    }

    /// Recommendations other users sent to `uid`.
    pub async fn incoming_recommendations(&self, uid: &str) -> Result<Vec<FeedItem>> {
        let records = self
            .store
            .list_incoming_recommendations(uid, self.page_limit())
            .await?;

        let refs = records
            .into_iter()
            .map(|r| FeedRef {
                participant: Participant {
                    display_name: r.from_name,
                    photo_url: r.from_photo_url,
                    uid: r.from,
                },
                media_id: r.media_id,
                media_type: r.media_type,
                timestamp: r.created_at,
                rating: r.sender_rating,
                note: r.message,
            })
            .collect();

        Ok(enrich(self.movies.as_ref(), merge_feed_refs(vec![refs], self.page_size)).await)
    }

    /// Recommendations `uid` sent. Recipients are named from the sender's
    /// friend list; someone no longer a friend shows as a bare ID.
    pub async fn sent_recommendations(&self, uid: &str) -> Result<Vec<FeedItem>> {
        let records = self
            .store
            .list_sent_recommendations(uid, self.page_limit())
            .await?;
        let friends: HashMap<String, Friend> = self
            .store
            .list_friends(uid)
            .await?
            .into_iter()
            .map(|f| (f.uid.clone(), f))
            .collect();

        let refs = records
            .into_iter()
            .map(|r| FeedRef {
                participant: friends
                    .get(&r.to)
                    .map(Participant::from)
                    .unwrap_or_else(|| Participant::bare(&r.to)),
                media_id: r.media_id,
                media_type: r.media_type,
                timestamp: r.created_at,
                rating: None,
                note: r.message,
            })
            .collect();

        Ok(enrich(self.movies.as_ref(), merge_feed_refs(vec![refs], self.page_size)).await)
    }

    fn page_limit(&self) -> u32 {
        u32::try_from(self.page_size).unwrap_or(u32::MAX)
    }
}

/// Merge reference batches into one newest-first list of at most
/// `page_size` items.
///
/// Ties on timestamp are broken by media ID, then participant, so the
/// output does not depend on the order the batches completed in.
pub fn merge_feed_refs(batches: Vec<Vec<FeedRef>>, page_size: usize) -> Vec<FeedRef> {
    let mut merged: Vec<FeedRef> = batches.into_iter().flatten().collect();
    merged.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.media_id.cmp(&b.media_id))
            .then_with(|| a.participant.uid.cmp(&b.participant.uid))
    });
    merged.truncate(page_size);
    merged
}

/// Resolve every reference concurrently and drop sentinel lookups.
pub async fn enrich(movies: &dyn MovieLookup, refs: Vec<FeedRef>) -> Vec<FeedItem> {
    let lookups = refs
        .iter()
        .map(|r| movies.get_movie(r.media_id, Some(r.media_type)));
    let resolved = join_all(lookups).await;

    refs.into_iter()
        .zip(resolved)
        .filter_map(|(r, movie)| {
            if movie.is_sentinel() {
                tracing::debug!(media_id = r.media_id, "Dropping unresolvable feed item");
                return None;
            }
            Some(FeedItem {
                participant: r.participant,
                movie,
                timestamp: r.timestamp,
                rating: r.rating,
                note: r.note,
            })
        })
        .collect()
}
