// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Service wiring for the `nearscan` binary

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{router, AppState};
use crate::cache::{CacheStore, MemoryStore, NoOpStore};
use crate::config::{ExplorerConfig, RepositoryBackend};
use crate::db::{AccountRepository, MemoryRepository, PgRepository};
use crate::provider::{JsonRpcProvider, NearRpc};
use crate::tracing::init_subscriber;

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let config = ExplorerConfig::from_env()?;
    init_subscriber(config.log_format);

    let state = build_state(&config)?;
    let listener = TcpListener::bind(config.listen_addr).await?;

    serve_api(listener, state).await
}

/// Builds the repository, RPC client and cache store described by `config`.
pub fn build_state(config: &ExplorerConfig) -> anyhow::Result<AppState> {
    let repo: Arc<dyn AccountRepository> = match &config.backend {
        RepositoryBackend::Postgres(db) => Arc::new(PgRepository::from_config(db)?),
        RepositoryBackend::Fixtures(path) => Arc::new(MemoryRepository::from_json_file(path)?),
    };

    let rpc: Arc<dyn NearRpc> = Arc::new(JsonRpcProvider::from_config(&config.rpc)?);

    let store: Arc<dyn CacheStore> = match (config.cache_enabled, config.cache_max_entries) {
        (false, _) => Arc::new(NoOpStore),
        (true, Some(max)) => Arc::new(MemoryStore::new().with_max_entries(max)),
        (true, None) => Arc::new(MemoryStore::new()),
    };

    info!(
        repository = repo.name(),
        rpc_url = %config.rpc.url,
        finality = %config.rpc.finality,
        cache_enabled = config.cache_enabled,
        "Explorer state ready"
    );

    Ok(AppState::new(repo, rpc, store, config.ttls))
}

/// Starts the API server.
pub async fn serve_api(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr = listener.local_addr()?;
    info!(address = ?addr, "Starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
