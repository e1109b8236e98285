// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI recommendations.
//!
//! Two flows, one prompt each:
//! - `recommend`: free-text viewing history, friend ratings and patterns in,
//!   one recommendation plus reasoning out
//! - `suggest`: free-text preferences in, a short list of titles out; every
//!   result is kept in the user's AI history
//!
//! Model output is returned as-is. Failures are surfaced, never retried.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{AiHistoryEntry, AiSuggestion, FeedItem, LibraryItem, SubscriptionTier};
use crate::services::collection::{CollectionFilter, CollectionSort};
use crate::services::gemini::GeminiClient;
use crate::services::{FeedService, LibraryService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// History entries returned by [`AiService::history`].
pub const HISTORY_LIMIT: u32 = 20;
/// Watched titles included when the client sends no viewing history.
const HISTORY_TITLES_IN_PROMPT: usize = 20;

const RECOMMEND_PROMPT: &str = "You are a movie recommendation expert. \
Based on the user's viewing history, their friends' ratings and any common \
patterns, recommend one movie the user has not seen yet.

Viewing history:
{viewing_history}

Friends' ratings:
{friend_ratings}

Common patterns:
{common_patterns}

Respond with a JSON object: {\"recommendation\": string, \"reasoning\": string}. \
The recommendation is the movie title; the reasoning explains the choice in two \
or three sentences.";

const SUGGEST_PROMPT: &str = "You are a movie recommendation expert. \
Suggest five movies matching these preferences:

{preferences}

Respond with a JSON object: {\"suggestions\": [{\"title\": string, \"year\": string, \
\"reasoning\": string}]}. Keep each reasoning to one sentence.";

/// Input to the single-recommendation flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationInput {
    #[serde(default)]
    #[validate(length(max = 8000))]
    pub viewing_history: String,
    #[serde(default)]
    #[validate(length(max = 8000))]
    pub friend_ratings: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub common_patterns: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOutput {
    pub recommendation: String,
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionList {
    #[serde(default)]
    suggestions: Vec<AiSuggestion>,
}

/// Generative-model collaborator.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, input: &RecommendationInput) -> Result<RecommendationOutput>;
    async fn suggest(&self, preferences: &str) -> Result<Vec<AiSuggestion>>;
}

/// [`Recommender`] backed by Gemini. Without an API key every call fails.
#[derive(Clone)]
pub struct GeminiRecommender {
    client: Option<GeminiClient>,
}

impl GeminiRecommender {
    pub fn new(client: Option<GeminiClient>) -> Self {
        if client.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, AI recommendations disabled");
        }
        Self { client }
    }

    fn client(&self) -> Result<&GeminiClient> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Ai("AI recommendations are not configured".to_string()))
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn recommend(&self, input: &RecommendationInput) -> Result<RecommendationOutput> {
        self.client()?.generate_json(&recommend_prompt(input)).await
    }

    async fn suggest(&self, preferences: &str) -> Result<Vec<AiSuggestion>> {
        let list: SuggestionList = self
            .client()?
            .generate_json(&suggest_prompt(preferences))
            .await?;
        Ok(list.suggestions)
    }
}

pub fn recommend_prompt(input: &RecommendationInput) -> String {
    fill_template(
        RECOMMEND_PROMPT,
        &[
            ("viewing_history", or_none(&input.viewing_history)),
            ("friend_ratings", or_none(&input.friend_ratings)),
            ("common_patterns", or_none(&input.common_patterns)),
        ],
    )
}

pub fn suggest_prompt(preferences: &str) -> String {
    fill_template(SUGGEST_PROMPT, &[("preferences", preferences.trim())])
}

/// Substitute `{name}` placeholders in a single pass. Substituted text is
/// never scanned again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let placeholder = values.iter().find(|(name, _)| {
            tail.strip_prefix(name).is_some_and(|after| after.starts_with('}'))
        });
        match placeholder {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

fn or_none(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "(none provided)"
    } else {
        text
    }
}

/// AI flows plus the context gathering and history around them.
#[derive(Clone)]
pub struct AiService {
    store: Arc<dyn Store>,
    recommender: Arc<dyn Recommender>,
    library: LibraryService,
    feed: FeedService,
}

impl AiService {
    pub fn new(
        store: Arc<dyn Store>,
        recommender: Arc<dyn Recommender>,
        library: LibraryService,
        feed: FeedService,
    ) -> Self {
        Self {
            store,
            recommender,
            library,
            feed,
        }
    }

    /// Run the single-recommendation flow. Empty history fields are filled
    /// from the user's collection and friend activity.
    pub async fn recommend(
        &self,
        uid: &str,
        mut input: RecommendationInput,
    ) -> Result<RecommendationOutput> {
        input.validate()?;

        if input.viewing_history.trim().is_empty() {
            let watched = self
                .library
                .collection(uid, &CollectionFilter::default(), CollectionSort::Recent)
                .await?;
            input.viewing_history = describe_library(&watched);
        }
        if input.friend_ratings.trim().is_empty() {
            let activity = self.feed.friend_activity(uid).await?;
            input.friend_ratings = describe_activity(&activity);
        }

        let output = self.recommender.recommend(&input).await?;
        tracing::info!(uid, recommendation = %output.recommendation, "AI recommendation generated");
        Ok(output)
    }

    /// Run the suggestion flow and store the result in the user's history.
    ///
    /// Pro subscribers only.
    pub async fn suggest(&self, uid: &str, preferences: &str) -> Result<AiHistoryEntry> {
        let preferences = preferences.trim();
        if preferences.is_empty() {
            return Err(AppError::BadRequest("Preferences are required".to_string()));
        }

        let user = self
            .store
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;
        if user.subscription != SubscriptionTier::Pro {
            return Err(AppError::Forbidden(
                "AI suggestions require a Pro subscription".to_string(),
            ));
        }

        let suggestions = self.recommender.suggest(preferences).await?;
        let entry = AiHistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            preferences: preferences.to_string(),
            suggestions,
            created_at: chrono::Utc::now(),
        };
        self.store.add_ai_history(uid, &entry).await?;

        tracing::info!(uid, count = entry.suggestions.len(), "AI suggestions stored");
        Ok(entry)
    }

    pub async fn history(&self, uid: &str) -> Result<Vec<AiHistoryEntry>> {
        self.store.list_ai_history(uid, HISTORY_LIMIT).await
    }
}

/// One line per watched title, most recent first.
fn describe_library(items: &[LibraryItem]) -> String {
    items
        .iter()
        .take(HISTORY_TITLES_IN_PROMPT)
        .map(|i| {
            let mut line = format!("- {} ({})", i.movie.title, i.movie.year);
            if i.user_rating > 0.0 {
                line.push_str(&format!(", rated {}", i.user_rating));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_activity(items: &[FeedItem]) -> String {
    items
        .iter()
        .map(|i| match i.rating {
            Some(r) => format!(
                "- {} watched {} and rated it {}",
                i.participant.display_name, i.movie.title, r
            ),
            None => format!("- {} watched {}", i.participant.display_name, i.movie.title),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
