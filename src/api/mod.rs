// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP API
//!
//! | Route | Field |
//! |---|---|
//! | `GET /v1/account/:id` | `account` |
//! | `GET /v1/account/:id/contract` | `contract` |
//! | `GET /v1/account/:id/deployments` | `deployments` |
//! | `GET /v1/account/:id/inventory` | `inventory` |
//! | `GET /v1/account/:id/tokens` | `tokens` |
//! | `GET /v1/account/:id/action/:method` | `action` |
//! | `GET /health` | |

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

mod envelope;
mod error;
pub mod handlers;
mod state;

pub use envelope::Envelope;
pub use error::ApiError;
pub use state::AppState;

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/account/:id", get(handlers::account))
        .route("/v1/account/:id/contract", get(handlers::contract))
        .route("/v1/account/:id/deployments", get(handlers::deployments))
        .route("/v1/account/:id/inventory", get(handlers::inventory))
        .route("/v1/account/:id/tokens", get(handlers::tokens))
        .route("/v1/account/:id/action/:method", get(handlers::action))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
