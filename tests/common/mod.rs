// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{DateTime, Duration, TimeZone, Utc};
use cinemate::config::Config;
use cinemate::db::{FirestoreDb, MemoryStore, Store};
use cinemate::error::{AppError, Result};
use cinemate::middleware::auth::create_jwt;
use cinemate::models::{
    AiSuggestion, Friend, MediaType, Movie, RatingRecord, SubscriptionTier, User,
};
use cinemate::routes::create_router;
use cinemate::services::recommender::RecommendationOutput;
use cinemate::services::{MovieLookup, RecommendationInput, Recommender};
use cinemate::AppState;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Movie IDs the fake lookup knows. Anything else resolves to the sentinel.
pub const KNOWN_MOVIE_IDS: std::ops::RangeInclusive<u64> = 1..=100;

/// Movie lookup that answers from a generated table without any I/O.
pub struct FakeMovies;

#[allow(dead_code)]
pub fn fake_movie(id: u64) -> Movie {
    Movie {
        id,
        title: format!("Movie {}", id),
        synopsis: format!("Synopsis of movie {}", id),
        genres: vec![if id % 2 == 0 { "Drama" } else { "Comedy" }.to_string()],
        year: (1980 + id % 40).to_string(),
        rating: (id % 10) as f64,
        image_url: format!("https://img.test/{}.png", id),
        image_hint: "movie poster".to_string(),
        media_type: MediaType::Movie,
    }
}

#[async_trait]
impl MovieLookup for FakeMovies {
    async fn get_movie(&self, id: u64, media_type: Option<MediaType>) -> Movie {
        if KNOWN_MOVIE_IDS.contains(&id) {
            fake_movie(id)
        } else {
            Movie::unknown(id, media_type.unwrap_or_default())
        }
    }

    async fn search(&self, query: &str) -> Vec<Movie> {
        let needle = query.to_lowercase();
        KNOWN_MOVIE_IDS
            .map(fake_movie)
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .collect()
    }

    async fn popular(&self) -> Vec<Movie> {
        (1..=5).map(fake_movie).collect()
    }
}

/// Recommender that echoes its input back.
pub struct FakeRecommender;

#[async_trait]
impl Recommender for FakeRecommender {
    async fn recommend(&self, input: &RecommendationInput) -> Result<RecommendationOutput> {
        if input.viewing_history.contains("FAIL") {
            return Err(AppError::Ai("model unavailable".to_string()));
        }
        Ok(RecommendationOutput {
            recommendation: "Movie 42".to_string(),
            reasoning: format!("history: {}", input.viewing_history.lines().count()),
        })
    }

    async fn suggest(&self, preferences: &str) -> Result<Vec<AiSuggestion>> {
        Ok(vec![AiSuggestion {
            title: "Movie 7".to_string(),
            year: "1987".to_string(),
            reasoning: format!("Because you asked for {}", preferences),
        }])
    }
}

/// Test app handle: the router, the shared state, and direct access to
/// the in-memory store for seeding.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

/// Create a test app over the in-memory store and fake collaborators.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config {
        checkout_timeout: StdDuration::from_millis(200),
        checkout_poll_interval: StdDuration::from_millis(10),
        ..Config::default()
    };
    create_test_app_with(config)
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        config,
        store.clone(),
        Arc::new(FakeMovies),
        Arc::new(FakeRecommender),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

#[allow(dead_code)]
impl TestApp {
    pub fn token(&self, uid: &str) -> String {
        create_jwt(uid, &self.state.config.jwt_signing_key).unwrap()
    }

    /// Send a request as `uid` and return the response.
    pub async fn request(
        &self,
        uid: &str,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(uid)));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Send a request as `uid` and parse the JSON body.
    pub async fn json(
        &self,
        uid: &str,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (axum::http::StatusCode, serde_json::Value) {
        let response = self.request(uid, method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn add_user(&self, uid: &str, tier: SubscriptionTier) -> User {
        let user = test_user(uid, tier);
        self.store.upsert_user(&user).await.unwrap();
        user
    }

    /// One-sided friend edge from `uid` to `friend`.
    pub async fn befriend(&self, uid: &str, friend: &User) {
        self.store
            .set_friend(uid, &Friend::from_user(friend, day(0)))
            .await
            .unwrap();
    }
}

#[allow(dead_code)]
pub fn test_user(uid: &str, tier: SubscriptionTier) -> User {
    User {
        uid: uid.to_string(),
        display_name: format!("User {}", uid),
        email: Some(format!("{}@example.com", uid)),
        photo_url: None,
        subscription: tier,
        created_at: day(0),
    }
}

/// Midnight UTC on day `n` of a fixed test calendar.
#[allow(dead_code)]
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// A public, watched rating updated on day `n`.
#[allow(dead_code)]
pub fn watched(media_id: u64, n: i64) -> RatingRecord {
    RatingRecord {
        watched: true,
        rating: 4.0,
        ..RatingRecord::new(media_id, MediaType::Movie, day(n))
    }
}
