// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Everything a user owns lives in sub-collections of `users/{uid}`:
//! - `friends` (friend edges)
//! - `ratings` (watched / watchlist / rating per media item)
//! - `sentRecommendations` and `incomingRecommendations`
//! - `aiRecommendations` (AI suggestion history)
//! - `checkout_sessions`
//!
//! Library counts live in the top-level `user_stats` collection.

use crate::db::{collections, RatingQuery, Store};
use crate::error::AppError;
use crate::models::{
    AiHistoryEntry, CheckoutSession, Friend, IncomingRecommendation, LibraryStats, RatingChange,
    RatingRecord, SentRecommendation, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreQueryDirection, FirestoreTransaction, ParentPathBuilder};
use futures_util::FutureExt;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. All database operations return an error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Path of `users/{uid}`, the parent of every per-user sub-collection.
    fn user_parent(&self, uid: &str) -> Result<ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a document into a per-user sub-collection.
    async fn put_in_user_col<T>(
        &self,
        uid: &str,
        collection: &str,
        doc_id: &str,
        object: &T,
    ) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync,
    {
        let parent = self.user_parent(uid)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .parent(&parent)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Read one document from a per-user sub-collection.
    async fn get_in_user_col<T>(
        &self,
        uid: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let parent = self.user_parent(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .parent(&parent)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Read the newest `limit` documents of a per-user sub-collection.
    async fn newest_in_user_col<T>(
        &self,
        uid: &str,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let parent = self.user_parent(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .parent(&parent)
            .order_by([("createdAt", FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one document from a per-user sub-collection.
    async fn delete_in_user_col(
        &self,
        uid: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<(), AppError> {
        let parent = self.user_parent(uid)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Read a rating record and the owner's library counts through a
/// transaction-bound client, so both reads take part in conflict detection.
///
/// When the user has no stats document yet, the counts are rebuilt from
/// their ratings.
async fn read_rating_and_stats(
    db: &firestore::FirestoreDb,
    parent: &ParentPathBuilder,
    uid: &str,
    doc_id: &str,
    now: DateTime<Utc>,
) -> Result<(Option<RatingRecord>, LibraryStats), FirestoreError> {
    let before: Option<RatingRecord> = db
        .fluent()
        .select()
        .by_id_in(collections::RATINGS)
        .parent(parent)
        .obj()
        .one(doc_id)
        .await?;

    let stats: Option<LibraryStats> = db
        .fluent()
        .select()
        .by_id_in(collections::USER_STATS)
        .obj()
        .one(uid)
        .await?;

    let stats = match stats {
        Some(stats) => stats,
        None => {
            let records: Vec<RatingRecord> = db
                .fluent()
                .select()
                .from(collections::RATINGS)
                .parent(parent)
                .obj()
                .query()
                .await?;
            tracing::info!(uid, ratings = records.len(), "Seeding library stats");
            LibraryStats::from_records(&records, now)
        }
    };

    Ok((before, stats))
}

/// Stage a rating write (or delete, if `after` is `None`) and the matching
/// stats write.
fn stage_rating_transition(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    parent: &ParentPathBuilder,
    uid: &str,
    doc_id: &str,
    after: Option<&RatingRecord>,
    stats: &LibraryStats,
) -> Result<(), FirestoreError> {
    match after {
        Some(record) => {
            db.fluent()
                .update()
                .in_col(collections::RATINGS)
                .document_id(doc_id)
                .parent(parent)
                .object(record)
                .add_to_transaction(transaction)?;
        }
        None => {
            db.fluent()
                .delete()
                .from(collections::RATINGS)
                .document_id(doc_id)
                .parent(parent)
                .add_to_transaction(transaction)?;
        }
    }

    db.fluent()
        .update()
        .in_col(collections::USER_STATS)
        .document_id(uid)
        .object(stats)
        .add_to_transaction(transaction)?;

    Ok(())
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Friend Operations ───────────────────────────────────────

    async fn list_friends(&self, uid: &str) -> Result<Vec<Friend>, AppError> {
        let parent = self.user_parent(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FRIENDS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_friend(&self, uid: &str, friend: &Friend) -> Result<(), AppError> {
        self.put_in_user_col(uid, collections::FRIENDS, &friend.uid, friend)
            .await
    }

    async fn delete_friend(&self, uid: &str, friend_uid: &str) -> Result<(), AppError> {
        self.delete_in_user_col(uid, collections::FRIENDS, friend_uid)
            .await
    }

    // ─── Rating Operations ───────────────────────────────────────

    async fn get_rating(&self, uid: &str, media_id: u64) -> Result<Option<RatingRecord>, AppError> {
        self.get_in_user_col(uid, collections::RATINGS, &media_id.to_string())
            .await
    }

    async fn query_ratings(
        &self,
        uid: &str,
        query: &RatingQuery,
    ) -> Result<Vec<RatingRecord>, AppError> {
        let parent = self.user_parent(uid)?;
        let watched = query.watched;
        let watchlist = query.watchlist;
        let public_only = query.public_only;

        let select = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RATINGS)
            .parent(&parent)
            .filter(move |q| {
                q.for_all([
                    watched.and_then(|w| q.field("watched").eq(w)),
                    watchlist.and_then(|w| q.field("watchlist").eq(w)),
                    if public_only {
                        q.field("isPrivate").eq(false)
                    } else {
                        None
                    },
                ])
            })
            .order_by([("updatedAt", FirestoreQueryDirection::Descending)]);

        let select = match query.limit {
            Some(limit) => select.limit(limit),
            None => select,
        };

        select
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        change: &RatingChange,
        now: DateTime<Utc>,
    ) -> Result<RatingRecord, AppError> {
        let owner = uid.to_string();
        let change = change.clone();

        // Firestore retries the closure when a concurrent write touches
        // either document.
        let after = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let uid = owner.clone();
                let change = change.clone();
                async move {
                    let parent = db.parent_path(collections::USERS, &uid)?;
                    let doc_id = media_id.to_string();
                    let (before, mut stats) =
                        read_rating_and_stats(&db, &parent, &uid, &doc_id, now).await?;

                    let mut after = before.clone().unwrap_or_else(|| {
                        RatingRecord::new(media_id, change.media_type.unwrap_or_default(), now)
                    });
                    change.apply(&mut after, now);
                    stats.apply_transition(before.as_ref(), Some(&after), now);

                    stage_rating_transition(
                        &db,
                        transaction,
                        &parent,
                        &uid,
                        &doc_id,
                        Some(&after),
                        &stats,
                    )?;
                    Ok::<_, BackoffError<FirestoreError>>(after)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Rating transaction failed: {}", e)))?;

        tracing::debug!(
            uid,
            media_id,
            watched = after.watched,
            watchlist = after.watchlist,
            "Rating record written"
        );

        Ok(after)
    }

    async fn delete_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let owner = uid.to_string();

        let deleted = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let uid = owner.clone();
                async move {
                    let parent = db.parent_path(collections::USERS, &uid)?;
                    let doc_id = media_id.to_string();
                    let (before, mut stats) =
                        read_rating_and_stats(&db, &parent, &uid, &doc_id, now).await?;
                    let Some(before) = before else {
                        return Ok(false);
                    };
                    stats.apply_transition(Some(&before), None, now);

                    stage_rating_transition(
                        &db,
                        transaction,
                        &parent,
                        &uid,
                        &doc_id,
                        None,
                        &stats,
                    )?;
                    Ok::<_, BackoffError<FirestoreError>>(true)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Rating transaction failed: {}", e)))?;

        if deleted {
            tracing::debug!(uid, media_id, "Rating record deleted");
        }
        Ok(deleted)
    }

    // ─── Library Stats Operations ────────────────────────────────

    async fn get_library_stats(&self, uid: &str) -> Result<Option<LibraryStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_library_stats(&self, uid: &str, stats: &LibraryStats) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STATS)
            .document_id(uid)
            .object(stats)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Recommendation Operations ───────────────────────────────

    async fn add_sent_recommendation(&self, rec: &SentRecommendation) -> Result<(), AppError> {
        self.put_in_user_col(&rec.from, collections::SENT_RECOMMENDATIONS, &rec.id, rec)
            .await
    }

    async fn add_incoming_recommendation(
        &self,
        to: &str,
        rec: &IncomingRecommendation,
    ) -> Result<(), AppError> {
        self.put_in_user_col(to, collections::INCOMING_RECOMMENDATIONS, &rec.id, rec)
            .await
    }

    async fn list_sent_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<SentRecommendation>, AppError> {
        self.newest_in_user_col(uid, collections::SENT_RECOMMENDATIONS, limit)
            .await
    }

    async fn list_incoming_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<IncomingRecommendation>, AppError> {
        self.newest_in_user_col(uid, collections::INCOMING_RECOMMENDATIONS, limit)
            .await
    }

    // ─── AI History Operations ───────────────────────────────────

    async fn add_ai_history(&self, uid: &str, entry: &AiHistoryEntry) -> Result<(), AppError> {
        self.put_in_user_col(uid, collections::AI_RECOMMENDATIONS, &entry.id, entry)
            .await
    }

    async fn list_ai_history(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<AiHistoryEntry>, AppError> {
        self.newest_in_user_col(uid, collections::AI_RECOMMENDATIONS, limit)
            .await
    }

    // ─── Checkout Session Operations ─────────────────────────────

    async fn create_checkout_session(
        &self,
        uid: &str,
        session: &CheckoutSession,
    ) -> Result<(), AppError> {
        self.put_in_user_col(uid, collections::CHECKOUT_SESSIONS, &session.id, session)
            .await
    }

    async fn get_checkout_session(
        &self,
        uid: &str,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, AppError> {
        self.get_in_user_col(uid, collections::CHECKOUT_SESSIONS, session_id)
            .await
    }
}
