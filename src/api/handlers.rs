// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Account endpoint handlers
//!
//! RPC-backed fields degrade to `null` (or an empty array) when the node is
//! unavailable. Database-backed resources fail the request instead.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, Instrument};

use super::envelope::Envelope;
use super::error::ApiError;
use super::state::AppState;
use crate::cache::{AccountResource, CacheKey, CacheStats, FetcherStats};
use crate::tracing::spans;
use crate::types::account::{AccountId, AccountInfo, MethodName};
use crate::types::contract::{ActionRecord, ContractInfo, DeploymentRecord};
use crate::types::holdings::{Inventory, TokenContracts};

fn parse_account(raw: &str) -> Result<AccountId, ApiError> {
    raw.parse().map_err(|e| ApiError::invalid("account id", e))
}

fn parse_method(raw: &str) -> Result<MethodName, ApiError> {
    raw.parse().map_err(|e| ApiError::invalid("method name", e))
}

/// `GET /v1/account/:id`
pub async fn account(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Envelope<AccountInfo>, ApiError> {
    let account_id = parse_account(&raw)?;
    let span = spans::account_endpoint("account", &account_id);

    async {
        let (repo, rpc) = (Arc::clone(&state.repo), Arc::clone(&state.rpc));
        let (db_id, rpc_id) = (account_id.clone(), account_id.clone());

        let (row, view) = tokio::join!(
            state.cached(&account_id, AccountResource::Identity, move || async move {
                repo.account(&db_id).await
            }),
            state.cached(&account_id, AccountResource::View, move || async move {
                rpc.view_account(&rpc_id).await
            }),
        );

        let row = row.into_result()?;
        if view.is_unavailable() {
            debug!("view_account unavailable, balance fields will be null");
        }

        Ok::<_, ApiError>(Envelope::optional(
            "account",
            AccountInfo::merge(&account_id, row, view.into_option()),
        ))
    }
    .instrument(span)
    .await
}

/// `GET /v1/account/:id/contract`
pub async fn contract(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Envelope<ContractInfo>, ApiError> {
    let account_id = parse_account(&raw)?;
    let span = spans::account_endpoint("contract", &account_id);

    async {
        let (code_rpc, keys_rpc) = (Arc::clone(&state.rpc), Arc::clone(&state.rpc));
        let (code_id, keys_id) = (account_id.clone(), account_id.clone());

        let (code, keys) = tokio::join!(
            state.cached(&account_id, AccountResource::Code, move || async move {
                code_rpc.view_code(&code_id).await
            }),
            state.cached(&account_id, AccountResource::AccessKeys, move || async move {
                keys_rpc.view_access_keys(&keys_id).await
            }),
        );

        let keys = keys.into_option();
        let info = code
            .into_option()
            .map(|code| ContractInfo::new(&account_id, &code, keys.as_ref()));

        Ok::<_, ApiError>(Envelope::optional("contract", info))
    }
    .instrument(span)
    .await
}

/// `GET /v1/account/:id/deployments`
pub async fn deployments(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Envelope<DeploymentRecord>, ApiError> {
    let account_id = parse_account(&raw)?;
    let span = spans::account_endpoint("deployments", &account_id);

    async {
        let repo = Arc::clone(&state.repo);
        let id = account_id.clone();
        let deployments = state
            .cached(&account_id, AccountResource::Deployments, move || async move {
                repo.first_last_deployments(&id).await
            })
            .await
            .into_result()?;

        Ok::<_, ApiError>(Envelope::new("deployments", deployments))
    }
    .instrument(span)
    .await
}

/// `GET /v1/account/:id/inventory`
pub async fn inventory(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Envelope<Inventory>, ApiError> {
    let account_id = parse_account(&raw)?;
    let span = spans::account_endpoint("inventory", &account_id);

    async {
        let repo = Arc::clone(&state.repo);
        let id = account_id.clone();
        let inventory = state
            .cached(&account_id, AccountResource::Inventory, move || async move {
                let (fts, nfts) = tokio::try_join!(repo.ft_holdings(&id), repo.nft_holdings(&id))?;
                Ok::<_, crate::errors::DatabaseError>(Inventory { fts, nfts })
            })
            .await
            .into_result()?;

        Ok::<_, ApiError>(Envelope::single("inventory", inventory))
    }
    .instrument(span)
    .await
}

/// `GET /v1/account/:id/tokens`
pub async fn tokens(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Envelope<TokenContracts>, ApiError> {
    let account_id = parse_account(&raw)?;
    let span = spans::account_endpoint("tokens", &account_id);

    async {
        let repo = Arc::clone(&state.repo);
        let id = account_id.clone();
        let tokens = state
            .cached(&account_id, AccountResource::Tokens, move || async move {
                repo.token_contracts(&id).await
            })
            .await
            .into_result()?;

        Ok::<_, ApiError>(Envelope::single("tokens", tokens))
    }
    .instrument(span)
    .await
}

/// `GET /v1/account/:id/action/:method`
pub async fn action(
    State(state): State<AppState>,
    Path((raw_account, raw_method)): Path<(String, String)>,
) -> Result<Envelope<ActionRecord>, ApiError> {
    let account_id = parse_account(&raw_account)?;
    let method = parse_method(&raw_method)?;
    let span = spans::account_endpoint("action", &account_id);

    async {
        let repo = Arc::clone(&state.repo);
        let (id, name) = (account_id.clone(), method.clone());
        let key = CacheKey::account(&account_id, AccountResource::Action)
            .with_segment(method.as_str());
        let action = state
            .cached_key(&key, AccountResource::Action, move || async move {
                repo.latest_action(&id, &name).await
            })
            .await
            .into_result()?;

        Ok::<_, ApiError>(Envelope::optional("action", action))
    }
    .instrument(span)
    .await
}

/// Liveness plus cache counters.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Always `"ok"` when the process can answer
    pub status: &'static str,
    /// Repository backend name
    pub repository: &'static str,
    /// Store statistics
    pub cache: CacheStats,
    /// Fetcher statistics
    pub fetcher: FetcherStats,
    /// Producers currently running
    pub inflight: usize,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        repository: state.repo.name(),
        cache: state.fetcher.store_stats().await,
        fetcher: state.fetcher.stats(),
        inflight: state.fetcher.inflight_count(),
    })
}
