// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user rating records (watched / watchlist state for one media item).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of media a record points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the movie database API.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

/// Rating record stored at `users/{uid}/ratings/{media_id}`.
///
/// The document ID is always `media_id.to_string()`.
/// `rating == 0.0` means "not rated yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub media_id: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub watchlist: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl RatingRecord {
    /// Empty record for a media item the user has not touched yet.
    pub fn new(media_id: u64, media_type: MediaType, now: DateTime<Utc>) -> Self {
        Self {
            media_id,
            rating: 0.0,
            watched: false,
            watchlist: false,
            is_private: false,
            media_type,
            notes: None,
            updated_at: now,
        }
    }

    /// Document ID for this record.
    pub fn doc_id(&self) -> String {
        self.media_id.to_string()
    }

    /// Whether a friend may see this record in their activity feed.
    pub fn is_visible_to_friends(&self) -> bool {
        self.watched && !self.is_private
    }
}

/// Partial update to a rating record. `None` fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub rating: Option<f64>,
    pub watched: Option<bool>,
    pub watchlist: Option<bool>,
    pub is_private: Option<bool>,
    pub media_type: Option<MediaType>,
    pub notes: Option<String>,
}

impl RatingChange {
    /// Merge this change into `record`, stamping `updated_at`.
    pub fn apply(&self, record: &mut RatingRecord, now: DateTime<Utc>) {
        if let Some(rating) = self.rating {
            record.rating = rating;
        }
        if let Some(watched) = self.watched {
            record.watched = watched;
        }
        if let Some(watchlist) = self.watchlist {
            record.watchlist = watchlist;
        }
        if let Some(is_private) = self.is_private {
            record.is_private = is_private;
        }
        if let Some(media_type) = self.media_type {
            record.media_type = media_type;
        }
        if let Some(notes) = &self.notes {
            record.notes = if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
        record.updated_at = now;
    }
}
