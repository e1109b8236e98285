// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout session creation and polling.
//!
//! A session document is written under the user, then polled until the
//! payment provider's webhook adds a `url` or an `error`, or the timeout
//! elapses.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{CheckoutOutcome, CheckoutSession};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn Store>,
    frontend_url: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl CheckoutService {
    pub fn new(
        store: Arc<dyn Store>,
        frontend_url: String,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            frontend_url,
            timeout,
            poll_interval,
        }
    }

    /// Create the session document. Returns it with its new ID.
    pub async fn create_session(&self, uid: &str, price: &str) -> Result<CheckoutSession> {
        let frontend = self.frontend_url.trim_end_matches('/');
        let session = CheckoutSession {
            id: uuid::Uuid::new_v4().to_string(),
            price: price.to_string(),
            success_url: format!("{}/profile?checkout=success", frontend),
            cancel_url: format!("{}/profile?checkout=cancelled", frontend),
            created_at: chrono::Utc::now(),
            url: None,
            error: None,
        };

        self.store.create_checkout_session(uid, &session).await?;
        tracing::info!(uid, session_id = %session.id, price, "Checkout session created");
        Ok(session)
    }

    /// Poll a session until it reaches a terminal state.
    pub async fn wait_for_outcome(&self, uid: &str, session_id: &str) -> Result<CheckoutOutcome> {
        let poll = async {
            let mut interval = tokio::time::interval(self.poll_interval);
            loop {
                interval.tick().await;
                let session = self
                    .store
                    .get_checkout_session(uid, session_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Checkout session {} not found", session_id))
                    })?;
                if let Some(outcome) = session.outcome() {
                    return Ok::<_, AppError>(outcome);
                }
            }
        };

        match tokio::time::timeout(self.timeout, poll).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(uid, session_id, timeout_secs = self.timeout.as_secs(), "Checkout session timed out");
                Err(AppError::CheckoutTimeout(session_id.to_string()))
            }
        }
    }

    /// Create a session and wait for the payment provider's redirect URL.
    pub async fn checkout(&self, uid: &str, price: &str) -> Result<String> {
        let session = self.create_session(uid, price).await?;
        match self.wait_for_outcome(uid, &session.id).await? {
            CheckoutOutcome::Redirect(url) => Ok(url),
            CheckoutOutcome::Failed(message) => {
                tracing::warn!(uid, session_id = %session.id, error = %message, "Checkout failed");
                Err(AppError::Payment(message))
            }
        }
    }
}
