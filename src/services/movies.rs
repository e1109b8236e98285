// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Movie lookup with graceful degradation.
//!
//! Every lookup resolves to a value. When TMDB is not configured or a call
//! fails, the static fallback table is used, and if the ID is not in the
//! table the "Unknown" sentinel is returned.

use crate::error::AppError;
use crate::models::MediaType;
use crate::models::Movie;
use crate::services::tmdb::TmdbClient;
use async_trait::async_trait;

/// Resolves media IDs and text queries to normalized movie records.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    /// Resolve one media item. Never fails; see [`Movie::is_sentinel`].
    ///
    /// Without a type hint the ID is tried as a movie first, then as a show.
    async fn get_movie(&self, id: u64, media_type: Option<MediaType>) -> Movie;

    /// Search by title text.
    async fn search(&self, query: &str) -> Vec<Movie>;

    /// Movies for the discovery page.
    async fn popular(&self) -> Vec<Movie>;
}

/// TMDB-backed lookup with the static fallback table.
#[derive(Clone)]
pub struct MovieService {
    tmdb: Option<TmdbClient>,
}

impl MovieService {
    /// `None` runs entirely from the fallback table.
    pub fn new(api_key: Option<String>) -> Result<Self, AppError> {
        if api_key.is_none() {
            tracing::warn!("TMDB_API_KEY not set, serving fallback movie data");
        }
        Ok(Self {
            tmdb: api_key.map(TmdbClient::new).transpose()?,
        })
    }

    pub fn with_client(tmdb: TmdbClient) -> Self {
        Self { tmdb: Some(tmdb) }
    }
}

#[async_trait]
impl MovieLookup for MovieService {
    async fn get_movie(&self, id: u64, media_type: Option<MediaType>) -> Movie {
        let Some(tmdb) = &self.tmdb else {
            return fallback_or_unknown(id, media_type);
        };

        let candidates = match media_type {
            Some(t) => vec![t],
            None => vec![MediaType::Movie, MediaType::Tv],
        };

        for candidate in candidates {
            match tmdb.get_details(id, candidate).await {
                Ok(movie) => return movie,
                Err(e) => {
                    tracing::debug!(id, media_type = candidate.as_str(), error = %e, "TMDB lookup failed");
                }
            }
        }

        tracing::warn!(id, "Movie lookup failed, using fallback data");
        fallback_or_unknown(id, media_type)
    }

    async fn search(&self, query: &str) -> Vec<Movie> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        if let Some(tmdb) = &self.tmdb {
            match tmdb.search_multi(query).await {
                Ok(results) => return results,
                Err(e) => {
                    tracing::warn!(query, error = %e, "TMDB search failed, using fallback data")
                }
            }
        }

        search_fallback(query)
    }

    async fn popular(&self) -> Vec<Movie> {
        if let Some(tmdb) = &self.tmdb {
            match tmdb.popular_movies().await {
                Ok(results) => return results,
                Err(e) => tracing::warn!(error = %e, "TMDB popular list failed, using fallback data"),
            }
        }

        fallback_movies()
    }
}

// ─── Fallback Table ──────────────────────────────────────────

/// (id, title, synopsis, genres, year, rating, media type)
type FallbackEntry = (
    u64,
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static str,
    f64,
    MediaType,
);

const FALLBACK_MOVIES: &[FallbackEntry] = &[
    (
        550,
        "Fight Club",
        "An insomniac office worker and a devil-may-care soap maker form an underground fight club.",
        &["Drama", "Thriller"],
        "1999",
        8.4,
        MediaType::Movie,
    ),
    (
        680,
        "Pulp Fiction",
        "The lives of two mob hitmen, a boxer and a pair of diner bandits intertwine.",
        &["Thriller", "Crime"],
        "1994",
        8.5,
        MediaType::Movie,
    ),
    (
        13,
        "Forrest Gump",
        "A man with a low IQ witnesses and unwittingly influences several defining events.",
        &["Comedy", "Drama", "Romance"],
        "1994",
        8.5,
        MediaType::Movie,
    ),
    (
        27205,
        "Inception",
        "A thief who steals corporate secrets through dream-sharing is given a chance at redemption.",
        &["Action", "Science Fiction", "Adventure"],
        "2010",
        8.4,
        MediaType::Movie,
    ),
    (
        155,
        "The Dark Knight",
        "Batman raises the stakes in his war on crime against a criminal mastermind known as the Joker.",
        &["Drama", "Action", "Crime", "Thriller"],
        "2008",
        8.5,
        MediaType::Movie,
    ),
    (
        603,
        "The Matrix",
        "A hacker learns the true nature of his reality and his role in the war against its controllers.",
        &["Action", "Science Fiction"],
        "1999",
        8.2,
        MediaType::Movie,
    ),
    (
        238,
        "The Godfather",
        "The aging patriarch of an organized crime dynasty transfers control to his reluctant son.",
        &["Drama", "Crime"],
        "1972",
        8.7,
        MediaType::Movie,
    ),
    (
        157336,
        "Interstellar",
        "A team of explorers travel through a wormhole in space to ensure humanity's survival.",
        &["Adventure", "Drama", "Science Fiction"],
        "2014",
        8.4,
        MediaType::Movie,
    ),
    (
        1396,
        "Breaking Bad",
        "A chemistry teacher diagnosed with cancer turns to manufacturing methamphetamine.",
        &["Drama", "Crime"],
        "2008",
        8.9,
        MediaType::Tv,
    ),
    (
        1399,
        "Game of Thrones",
        "Noble families vie for control of the Iron Throne of the Seven Kingdoms of Westeros.",
        &["Sci-Fi & Fantasy", "Drama", "Action & Adventure"],
        "2011",
        8.5,
        MediaType::Tv,
    ),
];

fn entry_to_movie(entry: &FallbackEntry) -> Movie {
    let (id, title, synopsis, genres, year, rating, media_type) = *entry;
    Movie {
        id,
        title: title.to_string(),
        synopsis: synopsis.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        year: year.to_string(),
        rating,
        image_url: "https://placehold.co/500x750.png".to_string(),
        image_hint: format!("{} poster", title),
        media_type,
    }
}

/// The whole fallback table.
pub fn fallback_movies() -> Vec<Movie> {
    FALLBACK_MOVIES.iter().map(entry_to_movie).collect()
}

/// Fallback entry for `id` (of the hinted type, if any), or the sentinel
/// for the hinted type.
pub fn fallback_or_unknown(id: u64, media_type: Option<MediaType>) -> Movie {
    FALLBACK_MOVIES
        .iter()
        .find(|entry| entry.0 == id && media_type.map_or(true, |t| t == entry.6))
        .map(entry_to_movie)
        .unwrap_or_else(|| Movie::unknown(id, media_type.unwrap_or_default()))
}

/// Case-insensitive title match over the fallback table.
fn search_fallback(query: &str) -> Vec<Movie> {
    let needle = query.to_lowercase();
    FALLBACK_MOVIES
        .iter()
        .filter(|entry| entry.1.to_lowercase().contains(&needle))
        .map(entry_to_movie)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::{UNKNOWN_MEDIA_TITLE, UNKNOWN_MOVIE_TITLE};
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_api_key_uses_fallback_table() {
        let service = MovieService::new(None).unwrap();
        let movie = service.get_movie(550, Some(MediaType::Movie)).await;

        assert_eq!(movie.title, "Fight Club");
        assert!(!movie.is_sentinel());
    }

    #[tokio::test]
    async fn test_unknown_id_resolves_to_sentinel() {
        let service = MovieService::new(None).unwrap();

        let movie = service.get_movie(999_999, None).await;
        assert_eq!(movie.title, UNKNOWN_MOVIE_TITLE);
        assert!(movie.is_sentinel());

        let show = service.get_movie(999_999, Some(MediaType::Tv)).await;
        assert_eq!(show.title, UNKNOWN_MEDIA_TITLE);
    }

    #[tokio::test]
    async fn test_unreachable_api_degrades_to_fallback() {
        // Nothing listens on port 9; every request fails to connect.
        let client = TmdbClient::with_base_url(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let service = MovieService::with_client(client);

        let movie = service.get_movie(603, None).await;
        assert_eq!(movie.title, "The Matrix");

        let results = service.search("dark").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 155);
    }

    #[tokio::test]
    async fn test_stalled_api_degrades_to_fallback() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = TmdbClient::with_base_url(
            "key".to_string(),
            format!("http://{}", addr),
            Duration::from_millis(100),
        )
        .unwrap();
        let service = MovieService::with_client(client);

        let movie = tokio::time::timeout(Duration::from_secs(5), service.get_movie(603, None))
            .await
            .expect("lookup should not hang");
        assert_eq!(movie.title, "The Matrix");

        let results = tokio::time::timeout(Duration::from_secs(5), service.search("dark"))
            .await
            .expect("search should not hang");
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_search_is_case_insensitive() {
        let service = MovieService::new(None).unwrap();
        let results = service.search("THE").await;
        let titles: Vec<&str> = results.iter().map(|m| m.title.as_str()).collect();

        assert!(titles.contains(&"The Matrix"));
        assert!(titles.contains(&"The Godfather"));
        assert!(service.search("   ").await.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_respects_type_hint() {
        let service = MovieService::new(None).unwrap();

        let show = service.get_movie(1396, Some(MediaType::Tv)).await;
        assert_eq!(show.title, "Breaking Bad");

        let movie = service.get_movie(1396, Some(MediaType::Movie)).await;
        assert_eq!(movie.title, UNKNOWN_MOVIE_TITLE);
        assert_eq!(movie.media_type, MediaType::Movie);

        let any = service.get_movie(1396, None).await;
        assert_eq!(any.media_type, MediaType::Tv);
    }

    #[test]
    fn test_fallback_table_has_no_sentinels() {
        assert!(fallback_movies().iter().all(|m| !m.is_sentinel()));
    }
}
