// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod checkout;
pub mod feed;
pub mod movie;
pub mod rating;
pub mod recommendation;
pub mod stats;
pub mod user;

pub use checkout::{CheckoutError, CheckoutOutcome, CheckoutSession};
pub use feed::{FeedItem, FeedRef, LibraryItem, Participant};
pub use movie::Movie;
pub use rating::{MediaType, RatingChange, RatingRecord};
pub use recommendation::{AiHistoryEntry, AiSuggestion, IncomingRecommendation, SentRecommendation};
pub use stats::LibraryStats;
pub use user::{Friend, SubscriptionTier, User};
