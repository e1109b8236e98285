// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized movie records returned by the movie lookup.

use serde::{Deserialize, Serialize};

use crate::models::MediaType;

/// Title of the sentinel record for a movie that could not be resolved.
pub const UNKNOWN_MOVIE_TITLE: &str = "Unknown Movie";
/// Title of the sentinel record for a TV show that could not be resolved.
pub const UNKNOWN_MEDIA_TITLE: &str = "Unknown Media";

/// Normalized movie/show details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    /// Release year as text. May be empty or otherwise unparseable.
    pub year: String,
    /// Audience rating on a 0-10 scale
    pub rating: f64,
    pub image_url: String,
    /// Short description of the poster, used as alt text
    pub image_hint: String,
    pub media_type: MediaType,
}

impl Movie {
    /// The record returned when a lookup fails and no fallback entry exists.
    pub fn unknown(id: u64, media_type: MediaType) -> Self {
        let title = match media_type {
            MediaType::Movie => UNKNOWN_MOVIE_TITLE,
            MediaType::Tv => UNKNOWN_MEDIA_TITLE,
        };
        Self {
            id,
            title: title.to_string(),
            synopsis: String::new(),
            genres: Vec::new(),
            year: String::new(),
            rating: 0.0,
            image_url: "https://placehold.co/500x750.png".to_string(),
            image_hint: "movie poster".to_string(),
            media_type,
        }
    }

    /// Whether this is a lookup-failure sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.title == UNKNOWN_MOVIE_TITLE || self.title == UNKNOWN_MEDIA_TITLE
    }

    /// Parsed release year, if the year text is a number.
    pub fn year_value(&self) -> Option<i32> {
        self.year.trim().get(..4).and_then(|y| y.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_titles() {
        assert!(Movie::unknown(1, MediaType::Movie).is_sentinel());
        assert!(Movie::unknown(1, MediaType::Tv).is_sentinel());
        assert_eq!(Movie::unknown(1, MediaType::Tv).title, "Unknown Media");
    }

    #[test]
    fn test_year_value() {
        let mut movie = Movie::unknown(1, MediaType::Movie);
        movie.year = "1999".to_string();
        assert_eq!(movie.year_value(), Some(1999));

        movie.year = "N/A".to_string();
        assert_eq!(movie.year_value(), None);

        movie.year = String::new();
        assert_eq!(movie.year_value(), None);
    }
}
