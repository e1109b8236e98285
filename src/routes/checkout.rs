// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription checkout.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/checkout", post(start_checkout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Payment provider price ID
    #[validate(length(min = 1, max = 128))]
    pub price: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Blocks until the payment provider has filled in the session URL.
async fn start_checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    req.validate()?;
    let url = state.checkout.checkout(&user.uid, &req.price).await?;
    Ok(Json(CheckoutResponse { url }))
}
