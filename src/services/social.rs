// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friends and friend-to-friend recommendations.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Friend, IncomingRecommendation, MediaType, SentRecommendation, User};
use std::sync::Arc;

#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

/// What the sender supplies when recommending a title.
#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub to: String,
    pub media_id: u64,
    pub media_type: MediaType,
    pub message: Option<String>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_friends(&self, uid: &str) -> Result<Vec<Friend>> {
        let mut friends = self.store.list_friends(uid).await?;
        friends.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        });
        Ok(friends)
    }

    /// Add `friend_uid` to the user's friend list.
    ///
    /// Only the user's own edge is written; the other user has to add them
    /// back separately.
    pub async fn add_friend(&self, uid: &str, friend_uid: &str) -> Result<Friend> {
        if uid == friend_uid {
            return Err(AppError::BadRequest(
                "You cannot add yourself as a friend".to_string(),
            ));
        }

        let profile = self.require_user(friend_uid).await?;
        let friend = Friend::from_user(&profile, chrono::Utc::now());
        self.store.set_friend(uid, &friend).await?;

        tracing::info!(uid, friend = friend_uid, "Friend added");
        Ok(friend)
    }

    pub async fn remove_friend(&self, uid: &str, friend_uid: &str) -> Result<()> {
        self.store.delete_friend(uid, friend_uid).await?;
        tracing::info!(uid, friend = friend_uid, "Friend removed");
        Ok(())
    }

    /// Write the sender's copy and the recipient's copy of a recommendation.
    ///
    /// The recipient copy carries the sender's profile and, if they rated
    /// the title, their rating.
    pub async fn send_recommendation(
        &self,
        uid: &str,
        rec: NewRecommendation,
    ) -> Result<SentRecommendation> {
        if uid == rec.to {
            return Err(AppError::BadRequest(
                "You cannot recommend a title to yourself".to_string(),
            ));
        }

        let sender = self.require_user(uid).await?;
        self.require_user(&rec.to).await?;

        let sender_rating = self
            .store
            .get_rating(uid, rec.media_id)
            .await?
            .map(|r| r.rating)
            .filter(|r| *r > 0.0);

        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now();
        let message = rec
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let sent = SentRecommendation {
            id: id.clone(),
            from: uid.to_string(),
            to: rec.to.clone(),
            media_id: rec.media_id,
            media_type: rec.media_type,
            message: message.clone(),
            created_at: now,
        };
        let incoming = IncomingRecommendation {
            id,
            from: sender.uid,
            from_name: sender.display_name,
            from_photo_url: sender.photo_url,
            media_id: rec.media_id,
            media_type: rec.media_type,
            sender_rating,
            message,
            created_at: now,
        };

        self.store.add_sent_recommendation(&sent).await?;
        self.store
            .add_incoming_recommendation(&rec.to, &incoming)
            .await?;

        tracing::info!(
            uid,
            to = %rec.to,
            media_id = rec.media_id,
            "Recommendation sent"
        );
        Ok(sent)
    }

    async fn require_user(&self, uid: &str) -> Result<User> {
        self.store
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
    }
}
