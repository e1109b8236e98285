// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory filtering and sorting of a user's library.
//!
//! The store only narrows by the watched / watchlist flag. Everything else
//! (rating range, year range, genres, media type, text) is applied here on
//! the already-enriched items.

use crate::models::{LibraryItem, MediaType};
use serde::Deserialize;

/// Filter over enriched library items. Unset fields match everything and
/// all set fields must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionFilter {
    /// Inclusive `[low, high]` on the user's own rating.
    pub rating_range: Option<(f64, f64)>,
    /// Inclusive lower bound on release year.
    pub year_start: Option<i32>,
    /// Inclusive upper bound on release year.
    pub year_end: Option<i32>,
    /// Any-of match against the movie's genres.
    pub genres: Vec<String>,
    pub media_type: Option<MediaType>,
    /// Case-insensitive substring of title or synopsis.
    pub text: Option<String>,
}

impl CollectionFilter {
    pub fn matches(&self, item: &LibraryItem) -> bool {
        self.matches_rating(item)
            && self.matches_year(item)
            && self.matches_genres(item)
            && self.matches_media_type(item)
            && self.matches_text(item)
    }

    /// Unrated items (rating 0) always pass.
    fn matches_rating(&self, item: &LibraryItem) -> bool {
        match self.rating_range {
            None => true,
            Some(_) if item.user_rating == 0.0 => true,
            Some((low, high)) => item.user_rating >= low && item.user_rating <= high,
        }
    }

    /// Items whose year cannot be parsed always pass.
    fn matches_year(&self, item: &LibraryItem) -> bool {
        let Some(year) = item.movie.year_value() else {
            return true;
        };
        self.year_start.is_none_or(|start| year >= start)
            && self.year_end.is_none_or(|end| year <= end)
    }

    fn matches_genres(&self, item: &LibraryItem) -> bool {
        self.genres.is_empty()
            || item.movie.genres.iter().any(|g| {
                self.genres
                    .iter()
                    .any(|selected| selected.eq_ignore_ascii_case(g))
            })
    }

    fn matches_media_type(&self, item: &LibraryItem) -> bool {
        self.media_type.is_none_or(|t| item.movie.media_type == t)
    }

    fn matches_text(&self, item: &LibraryItem) -> bool {
        let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = text.to_lowercase();
        item.movie.title.to_lowercase().contains(&needle)
            || item.movie.synopsis.to_lowercase().contains(&needle)
    }
}

/// Sort order for library listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSort {
    /// Most recently updated first
    #[default]
    Recent,
    /// Title A-Z
    Title,
    /// User's own rating, highest first
    UserRating,
    /// Audience rating, highest first
    MovieRating,
    /// Release year, newest first; unparseable years last
    Year,
}

/// Filter then sort.
pub fn apply(
    items: Vec<LibraryItem>,
    filter: &CollectionFilter,
    sort: CollectionSort,
) -> Vec<LibraryItem> {
    let mut items: Vec<LibraryItem> = items.into_iter().filter(|i| filter.matches(i)).collect();

    match sort {
        CollectionSort::Recent => items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        CollectionSort::Title => items.sort_by(|a, b| {
            a.movie
                .title
                .to_lowercase()
                .cmp(&b.movie.title.to_lowercase())
        }),
        CollectionSort::UserRating => {
            items.sort_by(|a, b| b.user_rating.total_cmp(&a.user_rating))
        }
        CollectionSort::MovieRating => {
            items.sort_by(|a, b| b.movie.rating.total_cmp(&a.movie.rating))
        }
        CollectionSort::Year => {
            items.sort_by_key(|i| std::cmp::Reverse(i.movie.year_value()))
        }
    }

    items
}
