//! Library count aggregates for the collection and watchlist pages.
//!
//! These are maintained on every rating write so the counts can be shown
//! without reading the whole ratings sub-collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RatingRecord;

/// Cached library counts for a user.
///
/// Stored at: `user_stats/{uid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    /// Number of rating records with `watched == true`
    #[serde(default)]
    pub watched_count: u32,
    /// Number of rating records with `watchlist == true`
    #[serde(default)]
    pub watchlist_count: u32,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LibraryStats {
    /// Apply the transition of one rating record from `before` to `after`.
    ///
    /// `None` on either side means the record did not exist (creation or
    /// deletion). Counts never go below zero.
    ///
    /// Returns `true` if any count changed.
    pub fn apply_transition(
        &mut self,
        before: Option<&RatingRecord>,
        after: Option<&RatingRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        let was_watched = before.is_some_and(|r| r.watched);
        let is_watched = after.is_some_and(|r| r.watched);
        let was_listed = before.is_some_and(|r| r.watchlist);
        let is_listed = after.is_some_and(|r| r.watchlist);

        let mut changed = false;
        changed |= adjust(&mut self.watched_count, was_watched, is_watched);
        changed |= adjust(&mut self.watchlist_count, was_listed, is_listed);

        if changed {
            self.updated_at = Some(now);
        }
        changed
    }

    /// Recompute counts from scratch.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a RatingRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.apply_transition(None, Some(record), now);
        }
        stats.updated_at = Some(now);
        stats
    }
}

fn adjust(count: &mut u32, was: bool, is: bool) -> bool {
    match (was, is) {
        (false, true) => {
            *count += 1;
            true
        }
        (true, false) => {
            *count = count.saturating_sub(1);
            true
        }
        _ => false,
    }
}
