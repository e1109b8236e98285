// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout session documents.
//!
//! The service only creates these. The payment provider's webhook later
//! fills in either `url` or `error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored at `users/{uid}/checkout_sessions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub id: String,
    /// Price identifier at the payment provider
    pub price: String,
    pub success_url: String,
    pub cancel_url: String,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    /// Redirect URL, written by the webhook on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Error payload, written by the webhook on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckoutError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutError {
    pub message: String,
}

/// Terminal state of a checkout session as seen by the poller.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Redirect(String),
    Failed(String),
}

impl CheckoutSession {
    /// Returns the terminal outcome if the webhook has written one.
    pub fn outcome(&self) -> Option<CheckoutOutcome> {
        if let Some(err) = &self.error {
            return Some(CheckoutOutcome::Failed(err.message.clone()));
        }
        self.url.clone().map(CheckoutOutcome::Redirect)
    }
}
