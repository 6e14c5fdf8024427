// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{AccountResource, CacheKey, CachedFetcher, CacheStore, Fetched};
use crate::config::CacheTtls;
use crate::db::AccountRepository;
use crate::provider::NearRpc;
use crate::types::account::AccountId;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Indexer data
    pub repo: Arc<dyn AccountRepository>,
    /// Live chain views
    pub rpc: Arc<dyn NearRpc>,
    /// Read-through cache in front of both
    pub fetcher: CachedFetcher,
    /// Cache lifetimes
    pub ttls: CacheTtls,
}

impl AppState {
    /// Assembles state over `store` with the given backends.
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        rpc: Arc<dyn NearRpc>,
        store: Arc<dyn CacheStore>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            repo,
            rpc,
            fetcher: CachedFetcher::new(store),
            ttls,
        }
    }

    /// Cached fetch of one account resource under its standard key and TTL.
    pub(crate) async fn cached<T, E, F, Fut>(
        &self,
        account_id: &AccountId,
        resource: AccountResource,
        producer: F,
    ) -> Fetched<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let key = CacheKey::account(account_id, resource);
        self.cached_key(&key, resource, producer).await
    }

    /// Like [`AppState::cached`] with an explicit key (e.g. one carrying a method name).
    pub(crate) async fn cached_key<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        resource: AccountResource,
        producer: F,
    ) -> Fetched<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.fetcher
            .fetch(key, self.ttls.for_resource(resource), producer)
            .await
    }
}
