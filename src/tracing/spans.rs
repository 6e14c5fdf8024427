// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span helpers for nearscan operations.
//!
//! Telemetry stays out of business logic: each instrumented operation has a
//! helper here and the call site attaches it with `.instrument(...)`.
//!
//! ```rust,ignore
//! async move { /* work */ }
//!     .instrument(spans::db_query("deployments", account_id))
//!     .await
//! ```

use std::time::Duration;

use tracing::Span;

use crate::types::account::AccountId;

/// Span around one cache-aside fetch.
///
/// Parent: the API handler span
/// Children: `nearscan.db_query` or `rpc_call` when the producer runs
#[inline]
pub(crate) fn cached_fetch(key: &str, ttl: Duration) -> Span {
    tracing::debug_span!(
        "nearscan.cached_fetch",
        key = %key,
        ttl_ms = ttl.as_millis() as u64,
        outcome = tracing::field::Empty,
    )
}

/// Span around a producer run started by the fetcher (lives in its own task).
#[inline]
pub(crate) fn produce(key: &str) -> Span {
    tracing::debug_span!("nearscan.produce", key = %key)
}

/// Span around one indexer database query.
#[inline]
pub(crate) fn db_query(query: &'static str, account_id: &AccountId) -> Span {
    tracing::debug_span!(
        "nearscan.db_query",
        query = query,
        account_id = %account_id,
        rows = tracing::field::Empty,
    )
}

/// Span around one RPC view request.
#[inline]
pub(crate) fn rpc_view(request_type: &'static str, account_id: &AccountId) -> Span {
    tracing::debug_span!(
        "nearscan.rpc_view",
        request_type = request_type,
        account_id = %account_id,
    )
}

/// Span around one account endpoint handler.
///
/// Parent: tower-http request span
#[inline]
pub(crate) fn account_endpoint(resource: &'static str, account_id: &AccountId) -> Span {
    tracing::info_span!(
        "nearscan.account_endpoint",
        resource = resource,
        account_id = %account_id,
    )
}
