// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CineMate: movie discovery and social ratings
//!
//! This crate provides the backend API for rating movies and TV shows,
//! following friends' activity, and asking an AI model for suggestions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{
    AiService, CheckoutService, FeedService, LibraryService, MovieLookup, Recommender,
    SocialService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub movies: Arc<dyn MovieLookup>,
    pub feed: FeedService,
    pub library: LibraryService,
    pub social: SocialService,
    pub ai: AiService,
    pub checkout: CheckoutService,
}

impl AppState {
    /// Wire the services over the given collaborators.
    pub fn new(
        config: Config,
        db: Arc<dyn Store>,
        movies: Arc<dyn MovieLookup>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        let feed = FeedService::new(db.clone(), movies.clone(), config.feed_page_size);
        let library = LibraryService::new(db.clone(), movies.clone());
        let social = SocialService::new(db.clone());
        let ai = AiService::new(db.clone(), recommender, library.clone(), feed.clone());
        let checkout = CheckoutService::new(
            db.clone(),
            config.frontend_url.clone(),
            config.checkout_timeout,
            config.checkout_poll_interval,
        );

        Self {
            config,
            db,
            movies,
            feed,
            library,
            social,
            ai,
            checkout,
        }
    }
}
