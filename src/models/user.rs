// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User and friend models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier. AI recommendations are a pro feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auth provider user ID (also used as document ID)
    pub uid: String,
    pub display_name: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub subscription: SubscriptionTier,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

/// Friend edge stored at `users/{uid}/friends/{friend_uid}`.
///
/// Mirrors the friend's profile fields at the time the edge was added.
/// Nothing keeps the reverse edge in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub uid: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub added_at: DateTime<Utc>,
}

impl Friend {
    /// Build a friend edge from the friend's own profile.
    pub fn from_user(user: &User, added_at: DateTime<Utc>) -> Self {
        Self {
            uid: user.uid.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
            added_at,
        }
    }
}
