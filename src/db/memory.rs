// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory [`Store`] used by tests and by the server when no Firestore
//! project is configured.
//!
//! Query semantics mirror the Firestore implementation: the same filters,
//! `updatedAt`/`createdAt` descending order, and limits.

use crate::db::{RatingQuery, Store};
use crate::error::AppError;
use crate::models::{
    AiHistoryEntry, CheckoutSession, Friend, IncomingRecommendation, LibraryStats, RatingChange,
    RatingRecord, SentRecommendation, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// Everything stored under `users/{uid}`.
#[derive(Default)]
struct UserDocs {
    friends: HashMap<String, Friend>,
    ratings: HashMap<u64, RatingRecord>,
    sent: HashMap<String, SentRecommendation>,
    incoming: HashMap<String, IncomingRecommendation>,
    ai_history: HashMap<String, AiHistoryEntry>,
    checkout_sessions: HashMap<String, CheckoutSession>,
}

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    docs: DashMap<String, UserDocs>,
    stats: DashMap<String, LibraryStats>,
    /// Users whose sub-collection reads fail (for error-path tests).
    failing: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every sub-collection read of `uid` fail with a database error.
    pub fn fail_reads_for(&self, uid: &str) {
        self.failing.insert(uid.to_string());
    }

    /// Store a rating record as-is, bypassing the library counts.
    pub fn insert_rating(&self, uid: &str, record: RatingRecord) {
        self.docs
            .entry(uid.to_string())
            .or_default()
            .ratings
            .insert(record.media_id, record);
    }

    /// Overwrite a checkout session, the way the payment webhook does.
    pub fn put_checkout_session(&self, uid: &str, session: CheckoutSession) {
        self.docs
            .entry(uid.to_string())
            .or_default()
            .checkout_sessions
            .insert(session.id.clone(), session);
    }

    /// Sessions still waiting for the payment provider.
    pub fn pending_checkout_sessions(&self, uid: &str) -> Vec<CheckoutSession> {
        self.docs
            .get(uid)
            .map(|docs| {
                docs.checkout_sessions
                    .values()
                    .filter(|s| s.outcome().is_none())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_readable(&self, uid: &str) -> Result<(), AppError> {
        if self.failing.contains(uid) {
            return Err(AppError::Database(format!(
                "Simulated read failure for user {}",
                uid
            )));
        }
        Ok(())
    }

    /// Read from `users/{uid}` without creating an entry.
    fn read_docs<T>(&self, uid: &str, f: impl FnOnce(&UserDocs) -> T) -> Result<T, AppError>
    where
        T: Default,
    {
        self.check_readable(uid)?;
        Ok(self.docs.get(uid).map(|docs| f(&docs)).unwrap_or_default())
    }

    fn write_docs<T>(&self, uid: &str, f: impl FnOnce(&mut UserDocs) -> T) -> T {
        let mut docs = self.docs.entry(uid.to_string()).or_default();
        f(&mut docs)
    }

    /// Library counts for `uid`, rebuilt from the stored ratings if the
    /// user has none yet. `docs` must be the caller's locked entry.
    fn stats_entry(
        &self,
        uid: &str,
        docs: &UserDocs,
        now: DateTime<Utc>,
    ) -> RefMut<'_, String, LibraryStats> {
        self.stats
            .entry(uid.to_string())
            .or_insert_with(|| LibraryStats::from_records(docs.ratings.values(), now))
    }
}

/// Sort newest first and apply an optional limit.
fn newest<T: Clone>(
    items: impl Iterator<Item = T>,
    key: impl Fn(&T) -> DateTime<Utc>,
    limit: Option<u32>,
) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(uid).map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.uid.clone(), user.clone());
        Ok(())
    }

    async fn list_friends(&self, uid: &str) -> Result<Vec<Friend>, AppError> {
        self.read_docs(uid, |docs| docs.friends.values().cloned().collect())
    }

    async fn set_friend(&self, uid: &str, friend: &Friend) -> Result<(), AppError> {
        self.write_docs(uid, |docs| {
            docs.friends.insert(friend.uid.clone(), friend.clone())
        });
        Ok(())
    }

    async fn delete_friend(&self, uid: &str, friend_uid: &str) -> Result<(), AppError> {
        self.write_docs(uid, |docs| docs.friends.remove(friend_uid));
        Ok(())
    }

    async fn get_rating(&self, uid: &str, media_id: u64) -> Result<Option<RatingRecord>, AppError> {
        self.read_docs(uid, |docs| docs.ratings.get(&media_id).cloned())
    }

    async fn query_ratings(
        &self,
        uid: &str,
        query: &RatingQuery,
    ) -> Result<Vec<RatingRecord>, AppError> {
        self.read_docs(uid, |docs| {
            newest(
                docs.ratings.values().filter(|r| query.matches(r)).cloned(),
                |r| r.updated_at,
                query.limit,
            )
        })
    }

    async fn update_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        change: &RatingChange,
        now: DateTime<Utc>,
    ) -> Result<RatingRecord, AppError> {
        let mut docs = self.docs.entry(uid.to_string()).or_default();
        let mut stats = self.stats_entry(uid, &docs, now);

        let before = docs.ratings.get(&media_id).cloned();
        let mut after = before.clone().unwrap_or_else(|| {
            RatingRecord::new(media_id, change.media_type.unwrap_or_default(), now)
        });
        change.apply(&mut after, now);
        docs.ratings.insert(media_id, after.clone());
        stats.apply_transition(before.as_ref(), Some(&after), now);

        Ok(after)
    }

    async fn delete_rating_atomic(
        &self,
        uid: &str,
        media_id: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut docs = self.docs.entry(uid.to_string()).or_default();
        if !docs.ratings.contains_key(&media_id) {
            return Ok(false);
        }
        let mut stats = self.stats_entry(uid, &docs, now);

        let before = docs.ratings.remove(&media_id);
        stats.apply_transition(before.as_ref(), None, now);

        Ok(true)
    }

    async fn get_library_stats(&self, uid: &str) -> Result<Option<LibraryStats>, AppError> {
        Ok(self.stats.get(uid).map(|s| s.clone()))
    }

    async fn set_library_stats(&self, uid: &str, stats: &LibraryStats) -> Result<(), AppError> {
        self.stats.insert(uid.to_string(), stats.clone());
        Ok(())
    }

    async fn add_sent_recommendation(&self, rec: &SentRecommendation) -> Result<(), AppError> {
        self.write_docs(&rec.from, |docs| docs.sent.insert(rec.id.clone(), rec.clone()));
        Ok(())
    }

    async fn add_incoming_recommendation(
        &self,
        to: &str,
        rec: &IncomingRecommendation,
    ) -> Result<(), AppError> {
        self.write_docs(to, |docs| {
            docs.incoming.insert(rec.id.clone(), rec.clone())
        });
        Ok(())
    }

    async fn list_sent_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<SentRecommendation>, AppError> {
        self.read_docs(uid, |docs| {
            newest(docs.sent.values().cloned(), |r| r.created_at, Some(limit))
        })
    }

    async fn list_incoming_recommendations(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<IncomingRecommendation>, AppError> {
        self.read_docs(uid, |docs| {
            newest(docs.incoming.values().cloned(), |r| r.created_at, Some(limit))
        })
    }

    async fn add_ai_history(&self, uid: &str, entry: &AiHistoryEntry) -> Result<(), AppError> {
        self.write_docs(uid, |docs| {
            docs.ai_history.insert(entry.id.clone(), entry.clone())
        });
        Ok(())
    }

    async fn list_ai_history(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<Vec<AiHistoryEntry>, AppError> {
        self.read_docs(uid, |docs| {
            newest(docs.ai_history.values().cloned(), |e| e.created_at, Some(limit))
        })
    }

    async fn create_checkout_session(
        &self,
        uid: &str,
        session: &CheckoutSession,
    ) -> Result<(), AppError> {
        self.put_checkout_session(uid, session.clone());
        Ok(())
    }

    async fn get_checkout_session(
        &self,
        uid: &str,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, AppError> {
        self.read_docs(uid, |docs| docs.checkout_sessions.get(session_id).cloned())
    }
}
