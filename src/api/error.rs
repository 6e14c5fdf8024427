// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::cache::FetchFailure;
use crate::types::account::InvalidIdentifier;

/// Request-level failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed path parameter
    #[error("Invalid {what}: {reason}")]
    BadRequest {
        /// Which parameter
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A database-backed resource could not be produced
    #[error(transparent)]
    Unavailable(#[from] FetchFailure),
}

impl ApiError {
    pub(crate) fn invalid(what: &'static str, reason: InvalidIdentifier) -> Self {
        ApiError::BadRequest {
            what,
            reason: reason.to_string(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unavailable(failure) => {
                error!(key = failure.key(), error = %failure.reason(), "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
