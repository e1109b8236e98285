// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed items: lightweight references before enrichment, display items after.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Friend, MediaType, Movie};

/// The other person in a feed item (the friend who watched, the sender or
/// the recipient of a recommendation).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub uid: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Participant {
    /// Participant with nothing but a user ID (no profile available).
    pub fn bare(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            display_name: uid.to_string(),
            photo_url: None,
        }
    }
}

impl From<&Friend> for Participant {
    fn from(friend: &Friend) -> Self {
        Self {
            uid: friend.uid.clone(),
            display_name: friend.display_name.clone(),
            photo_url: friend.photo_url.clone(),
        }
    }
}

/// Reference record pointing at a media item, not yet enriched.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRef {
    pub participant: Participant,
    pub media_id: u64,
    pub media_type: MediaType,
    pub timestamp: DateTime<Utc>,
    pub rating: Option<f64>,
    pub note: Option<String>,
}

/// Display-ready feed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub participant: Participant,
    pub movie: Movie,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A movie from the user's own library, joined with their rating record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub movie: Movie,
    pub user_rating: f64,
    pub watched: bool,
    pub watchlist: bool,
    pub is_private: bool,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}
