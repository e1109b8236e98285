// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TMDB (The Movie Database) API client.
//!
//! Handles:
//! - Movie and TV detail lookups
//! - Multi search (movies and TV in one result page)
//! - Popular movies for the discovery page
//!
//! Responses are mapped to [`Movie`]. Callers decide what to do on failure.

use crate::error::AppError;
use crate::models::{MediaType, Movie};
use serde::Deserialize;
use std::time::Duration;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/500x750.png";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB API client.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, AppError> {
        Self::with_base_url(api_key, TMDB_BASE_URL.to_string(), REQUEST_TIMEOUT)
    }

    /// Client pointed at a different host (for tests against a local server).
    ///
    /// A request that takes longer than `timeout` fails like any other.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Get movie or TV details by ID.
    pub async fn get_details(&self, id: u64, media_type: MediaType) -> Result<Movie, AppError> {
        let url = format!("{}/{}/{}", self.base_url, media_type.as_str(), id);
        let details: TmdbDetails = self.get_json(&url, &[]).await?;
        Ok(details.into_movie(media_type))
    }

    /// Search movies and TV shows by free text. People are dropped.
    pub async fn search_multi(&self, query: &str) -> Result<Vec<Movie>, AppError> {
        let url = format!("{}/search/multi", self.base_url);
        let page: TmdbPage = self
            .get_json(&url, &[("query", query), ("include_adult", "false")])
            .await?;

        Ok(page
            .results
            .into_iter()
            .filter_map(|r| {
                let media_type = match r.media_type.as_deref() {
                    Some("movie") => MediaType::Movie,
                    Some("tv") => MediaType::Tv,
                    _ => return None,
                };
                Some(r.into_movie(media_type))
            })
            .collect())
    }

    /// First page of popular movies.
    pub async fn popular_movies(&self) -> Result<Vec<Movie>, AppError> {
        let url = format!("{}/movie/popular", self.base_url);
        let page: TmdbPage = self.get_json(&url, &[]).await?;
        Ok(page
            .results
            .into_iter()
            .map(|r| r.into_movie(MediaType::Movie))
            .collect())
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::MovieApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("TMDB rate limit hit (429)");
            }

            return Err(AppError::MovieApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::MovieApi(format!("JSON parse error: {}", e)))
    }
}

/// Detail response for `/movie/{id}` and `/tv/{id}`.
///
/// Movies use `title`/`release_date`, shows use `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
struct TmdbDetails {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TmdbGenre {
    name: String,
}

impl TmdbDetails {
    fn into_movie(self, media_type: MediaType) -> Movie {
        let title = self.title.or(self.name).unwrap_or_default();
        Movie {
            id: self.id,
            image_hint: format!("{} poster", title),
            title,
            synopsis: self.overview.unwrap_or_default(),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            year: year_of(self.release_date.or(self.first_air_date)),
            rating: self.vote_average,
            image_url: poster_url(self.poster_path.as_deref()),
            media_type,
        }
    }
}

/// One page of search / list results.
#[derive(Debug, Clone, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<TmdbResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct TmdbResult {
    id: u64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    poster_path: Option<String>,
}

impl TmdbResult {
    fn into_movie(self, media_type: MediaType) -> Movie {
        let title = self.title.or(self.name).unwrap_or_default();
        Movie {
            id: self.id,
            image_hint: format!("{} poster", title),
            title,
            synopsis: self.overview.unwrap_or_default(),
            genres: self
                .genre_ids
                .iter()
                .filter_map(|id| genre_name(*id))
                .map(str::to_string)
                .collect(),
            year: year_of(self.release_date.or(self.first_air_date)),
            rating: self.vote_average,
            image_url: poster_url(self.poster_path.as_deref()),
            media_type,
        }
    }
}

/// "1999-10-15" -> "1999". Empty if the date is missing or too short.
fn year_of(date: Option<String>) -> String {
    date.as_deref()
        .and_then(|d| d.get(..4))
        .unwrap_or_default()
        .to_string()
}

fn poster_url(path: Option<&str>) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}{}", TMDB_IMAGE_BASE_URL, p),
        _ => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

/// TMDB's fixed genre IDs (movie and TV lists combined).
fn genre_name(id: u32) -> Option<&'static str> {
    let name = match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        10759 => "Action & Adventure",
        10762 => "Kids",
        10763 => "News",
        10764 => "Reality",
        10765 => "Sci-Fi & Fantasy",
        10766 => "Soap",
        10767 => "Talk",
        10768 => "War & Politics",
        _ => return None,
    };
    Some(name)
}
