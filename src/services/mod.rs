// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod checkout;
pub mod collection;
pub mod feed;
pub mod gemini;
pub mod library;
pub mod movies;
pub mod recommender;
pub mod social;
pub mod tmdb;

pub use checkout::CheckoutService;
pub use collection::{CollectionFilter, CollectionSort};
pub use feed::FeedService;
pub use gemini::GeminiClient;
pub use library::LibraryService;
pub use movies::{MovieLookup, MovieService};
pub use recommender::{AiService, GeminiRecommender, RecommendationInput, Recommender};
pub use social::{NewRecommendation, SocialService};
pub use tmdb::TmdbClient;
