// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend-to-friend and AI recommendation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MediaType;

/// Sender-side copy, stored at `users/{from}/sentRecommendations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentRecommendation {
    pub id: String,
    pub from: String,
    pub to: String,
    pub media_id: u64,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

/// Recipient-side copy, stored at `users/{to}/incomingRecommendations/{id}`.
///
/// Carries enough of the sender's profile to render without a second read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRecommendation {
    pub id: String,
    pub from: String,
    pub from_name: String,
    #[serde(rename = "fromPhotoURL", default)]
    pub from_photo_url: Option<String>,
    pub media_id: u64,
    #[serde(default)]
    pub media_type: MediaType,
    /// Sender's own rating of the item, if they had one.
    #[serde(default)]
    pub sender_rating: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

/// One title suggested by the generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub title: String,
    pub year: String,
    pub reasoning: String,
}

/// AI suggestion history entry, stored at `users/{uid}/aiRecommendations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHistoryEntry {
    pub id: String,
    pub preferences: String,
    pub suggestions: Vec<AiSuggestion>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}
