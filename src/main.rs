// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CineMate API Server
//!
//! Serves ratings, friend feeds, movie lookups and AI recommendations for
//! the CineMate web client.

use cinemate::{
    config::Config,
    db::{FirestoreDb, MemoryStore, Store},
    services::{GeminiClient, GeminiRecommender, MovieService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Project ID that selects the in-memory store when no emulator is set.
const OFFLINE_PROJECT_ID: &str = "local-dev";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting CineMate API");

    let db: Arc<dyn Store> = if config.gcp_project_id == OFFLINE_PROJECT_ID
        && std::env::var("FIRESTORE_EMULATOR_HOST").is_err()
    {
        tracing::warn!("No Firestore project configured; using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FirestoreDb::new(&config.gcp_project_id).await?)
    };

    let movies = Arc::new(MovieService::new(config.tmdb_api_key.clone())?);

    let gemini = match &config.gemini_api_key {
        Some(key) => Some(GeminiClient::new(key.clone(), config.gemini_model.clone())?),
        None => None,
    };
    let recommender = Arc::new(GeminiRecommender::new(gemini));

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::new(config, db, movies, recommender));

    // Build router
    let app = cinemate::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cinemate=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
