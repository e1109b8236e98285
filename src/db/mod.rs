//! Database layer (Firestore, plus an in-memory store for tests and offline mode).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{
    AiHistoryEntry, CheckoutSession, Friend, IncomingRecommendation, LibraryStats, RatingChange,
    RatingRecord, SentRecommendation, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// User library counts (keyed by uid)
    pub const USER_STATS: &str = "user_stats";

    // Sub-collections under `users/{uid}`
    pub const FRIENDS: &str = "friends";
    pub const RATINGS: &str = "ratings";
    pub const SENT_RECOMMENDATIONS: &str = "sentRecommendations";
    pub const INCOMING_RECOMMENDATIONS: &str = "incomingRecommendations";
    pub const AI_RECOMMENDATIONS: &str = "aiRecommendations";
    pub const CHECKOUT_SESSIONS: &str = "checkout_sessions";
}

/// Filter for a ratings sub-collection query.
///
/// Results are always ordered by `updatedAt` descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingQuery {
    pub watched: Option<bool>,
    pub watchlist: Option<bool>,
    /// Only records with `isPrivate == false`
    pub public_only: bool,
    pub limit: Option<u32>,
}

impl RatingQuery {
    /// Watched, public records (what friends are allowed to see).
    pub fn friend_visible(limit: u32) -> Self {
        Self {
            watched: Some(true),
            public_only: true,
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn watched() -> Self {
        Self {
            watched: Some(true),
            ..Default::default()
        }
    }

    pub fn watchlist() -> Self {
        Self {
            watchlist: Some(true),
            ..Default::default()
        }
    }

    /// Whether a record satisfies the filter part of this query.
    pub fn matches(&self, record: &RatingRecord) -> bool {
        self.watched.is_none_or(|w| record.watched == w)
            && self.watchlist.is_none_or(|w| record.watchlist == w)
            && (!self.public_only || !record.is_private)
    }
}

/// Typed document-store operations used by the services.
///
/// Constructed once in `main` and passed around explicitly so the
/// aggregation logic can run against [`MemoryStore`] in tests.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────
    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError>;
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    // ─── Friends ─────────────────────────────────────────────────
    /// All friend edges of `uid` (no pagination).
    async fn list_friends(&self, uid: &str) -> Result<Vec<Friend>, AppError>;
    async fn set_friend(&self, uid: &str, friend: &Friend) -> Result<(), AppError>;
    async fn delete_friend(&self, uid: &str, friend_uid: &str) -> Result<(), AppError>;

    // ─── Ratings ─────────────────────────────────────────────────
    async fn get_rating(&self, uid: &str, media_id: u64) -> Result<Option<RatingRecord>, AppError>;
    async fn query_ratings(
        &self,
        uid: &str,
        query: &RatingQuery,
    ) -> Result<Vec<RatingRecord>, AppError>;

    /// Merge `change` into the rating record (creating it if needed) and
    /// update the library counts in the same write.
    ///
    /// A user without stored counts gets them rebuilt from their ratings
    /// before the change is applied.
    ///
    /// Returns the record as written.
    async fn update_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        change: &RatingChange,
        now: DateTime<Utc>,
    ) -> Result<RatingRecord, AppError>;

    /// Delete a rating record and update the library counts.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn get_library_stats(&self, uid: &str) -> Result<Option<LibraryStats>, AppError>;
    async fn set_library_stats(&self, uid: &str, stats: &LibraryStats) -> Result<(), AppError>;

    // ─── Recommendations ─────────────────────────────────────────
    /// Store under the sender (`rec.from`).
    async fn add_sent_recommendation(&self, rec: &SentRecommendation) -> Result<(), AppError>;
    /// Store under the recipient `to`.
    async fn add_incoming_recommendation(
        &self,
        to: &str,
        rec: &IncomingRecommendation,
    ) -> Result<(), AppError>;
    /// Newest first.
    async fn list_sent_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<SentRecommendation>, AppError>;
    /// Newest first.
    async fn list_incoming_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<IncomingRecommendation>, AppError>;

    // ─── AI history ──────────────────────────────────────────────
    async fn add_ai_history(&self, uid: &str, entry: &AiHistoryEntry) -> Result<(), AppError>;
    /// Newest first.
    async fn list_ai_history(&self, uid: &str, limit: u32)
        -> Result<Vec<AiHistoryEntry>, AppError>;

    // ─── Checkout sessions ───────────────────────────────────────
    async fn create_checkout_session(
        &self,
        uid: &str,
        session: &CheckoutSession,
    ) -> Result<(), AppError>;
    async fn get_checkout_session(
        &self,
        uid: &str,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, AppError>;
}
