// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache-aside fetching with single-flight suppression
//!
//! [`CachedFetcher::fetch`] looks a key up in the shared store; on a miss it
//! runs the caller's producer, stores a successful result with the caller's
//! TTL and returns it. A failed producer is never cached.
//!
//! # Per-key lifecycle
//!
//! ```text
//!            producer ok                ttl elapses
//!  absent ──────────────► fresh ───────────────────► expired
//!    │  ▲                   ▲                           │
//!    │  └── producer err ───┼──── producer ok ──────────┤
//!    │      (no change)     └───────────────────────────┘
//!    └── producer err: stays absent, error returned as Unavailable
//! ```
//!
//! # Single-flight
//!
//! Concurrent misses for one key share a single producer call. The first miss
//! installs an in-flight marker (atomic `DashMap` entry insert); later misses
//! await the same shared future. The producer runs on its own task, so a
//! caller that is dropped mid-request does not cancel it for the others. The
//! marker is removed when the producer task ends, whether it stored a value,
//! failed, panicked or was aborted. New callers then hit the store again or
//! start a fresh flight.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument, Span};

use super::keys::CacheKey;
use super::store::CacheStore;
use super::types::{CacheStats, FetcherStats};
use crate::errors::CacheError;
use crate::tracing::spans;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, FetchFailure>>>;

/// In-flight marker for one key. `id` tells flights for the same key apart.
#[derive(Clone)]
struct Flight {
    id: u64,
    shared: SharedFetch,
}

type InflightMap = DashMap<String, Flight>;

type ProducerHandle = JoinHandle<Result<Value, FetchFailure>>;

/// Releases a key's in-flight marker when the producer task ends.
///
/// Dropped on completion, on panic and on abort alike, and only removes the
/// marker it was created for.
struct FlightGuard {
    inflight: Arc<InflightMap>,
    key: String,
    id: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.inflight.remove_if(&self.key, |_, flight| flight.id == self.id);
    }
}

/// Outcome of a cached fetch.
///
/// "No data" is an explicit variant rather than an error to unwind: call
/// sites decide per field whether it becomes `null` or propagates.
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    /// Served from the store without invoking the producer
    Hit(T),
    /// Produced on this call (or by the in-flight call this one joined) and stored
    Fresh(T),
    /// The producer failed; nothing was stored
    Unavailable(FetchFailure),
}

impl<T> Fetched<T> {
    /// The value, or `None` if unavailable.
    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Hit(value) | Fetched::Fresh(value) => Some(value),
            Fetched::Unavailable(_) => None,
        }
    }

    /// The value, or the failure that prevented producing it.
    pub fn into_result(self) -> Result<T, FetchFailure> {
        match self {
            Fetched::Hit(value) | Fetched::Fresh(value) => Ok(value),
            Fetched::Unavailable(failure) => Err(failure),
        }
    }

    /// True if served from the store.
    pub fn is_hit(&self) -> bool {
        matches!(self, Fetched::Hit(_))
    }

    /// True if the producer failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Fetched::Unavailable(_))
    }

    /// Maps the contained value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Hit(value) => Fetched::Hit(f(value)),
            Fetched::Fresh(value) => Fetched::Fresh(f(value)),
            Fetched::Unavailable(failure) => Fetched::Unavailable(failure),
        }
    }
}

/// Why a fetch produced no data.
///
/// Cloneable so one failure can be handed to every coalesced waiter.
#[derive(Debug, Clone, thiserror::Error)]
#[error("No data for {key}")]
pub struct FetchFailure {
    key: String,
    #[source]
    source: Arc<dyn StdError + Send + Sync>,
}

impl FetchFailure {
    fn new(key: &str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            key: key.to_string(),
            source: Arc::new(source),
        }
    }

    /// Key whose producer failed.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The producer's (or the cache's) error.
    pub fn reason(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.source
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    producer_calls: AtomicU64,
    producer_failures: AtomicU64,
    coalesced: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FetcherStats {
        FetcherStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            producer_calls: self.producer_calls.load(Ordering::Relaxed),
            producer_failures: self.producer_failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Read-through cache front for expensive producers (DB queries, RPC calls).
///
/// Cheap to clone; clones share the store, in-flight markers and counters.
///
/// # Examples
///
/// ```rust,ignore
/// let fetcher = CachedFetcher::new(Arc::new(MemoryStore::new()));
/// let key = CacheKey::account(&account_id, AccountResource::View);
///
/// let view = fetcher
///     .fetch(&key, Duration::from_secs(5), move || async move {
///         rpc.view_account(&account_id).await
///     })
///     .await
///     .into_option();
/// ```
#[derive(Clone)]
pub struct CachedFetcher {
    store: Arc<dyn CacheStore>,
    inflight: Arc<InflightMap>,
    next_flight: Arc<AtomicU64>,
    counters: Arc<Counters>,
}

impl CachedFetcher {
    /// Creates a fetcher over `store`.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            inflight: Arc::new(DashMap::new()),
            next_flight: Arc::new(AtomicU64::new(0)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Returns the cached value for `key` or produces, stores and returns it.
    ///
    /// The producer is invoked at most once per concurrent group of misses and
    /// only when no live entry exists. Its error is returned as
    /// [`Fetched::Unavailable`] and is not stored.
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        producer: F,
    ) -> Fetched<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: StdError + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let span = spans::cached_fetch(key.as_str(), ttl);
        async move {
            if let Some(value) = self.lookup::<T>(key.as_str()).await {
                Counters::bump(&self.counters.hits);
                Span::current().record("outcome", "hit");
                return Fetched::Hit(value);
            }
            Counters::bump(&self.counters.misses);

            let flight = self.join_or_start(key.as_str(), ttl, producer);
            let result = flight.await;
            Span::current().record("outcome", if result.is_ok() { "fresh" } else { "unavailable" });
            match result {
                Ok(json) => match serde_json::from_value::<T>(json) {
                    Ok(value) => Fetched::Fresh(value),
                    Err(source) => Fetched::Unavailable(FetchFailure::new(
                        key.as_str(),
                        CacheError::Decode {
                            key: key.to_string(),
                            source,
                        },
                    )),
                },
                Err(failure) => Fetched::Unavailable(failure),
            }
        }
        .instrument(span)
        .await
    }

    /// Store statistics.
    pub async fn store_stats(&self) -> CacheStats {
        self.store.stats().await
    }

    /// Producer-side statistics.
    pub fn stats(&self) -> FetcherStats {
        self.counters.snapshot()
    }

    /// Number of keys with a producer currently running.
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match self.store.get(key).await {
            Ok(payload) => payload?,
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    key,
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Undecodable cache payload, treating as miss");
                None
            }
        }
    }

    fn join_or_start<T, E, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> SharedFetch
    where
        T: Serialize + Send + 'static,
        E: StdError + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        // The entry lock is held only for the check-and-insert. The producer is
        // spawned after it is released, so a task dropped at spawn time can
        // release its marker without contending for the same shard.
        let (shared, start) = match self.inflight.entry(key.to_string()) {
            Entry::Occupied(flight) => {
                Counters::bump(&self.counters.coalesced);
                debug!(key, "Joining in-flight fetch");
                (flight.get().shared.clone(), None)
            }
            Entry::Vacant(slot) => {
                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let (handle_tx, handle_rx) = oneshot::channel::<ProducerHandle>();
                let shared = self.await_producer(key, id, handle_rx);
                slot.insert(Flight {
                    id,
                    shared: shared.clone(),
                });
                (shared, Some((id, handle_tx)))
            }
        };

        if let Some((id, handle_tx)) = start {
            let guard = FlightGuard {
                inflight: Arc::clone(&self.inflight),
                key: key.to_string(),
                id,
            };
            let task = produce_and_store(
                Arc::clone(&self.store),
                Arc::clone(&self.counters),
                guard,
                ttl,
                producer,
            );
            let handle = tokio::spawn(task.instrument(spans::produce(key)));
            // `shared` still owns the receiver, so the send cannot fail.
            let _ = handle_tx.send(handle);
        }

        shared
    }

    /// Shared result of one flight: the producer task's output, or a failure
    /// if the task panicked, was aborted or never started.
    fn await_producer(
        &self,
        key: &str,
        id: u64,
        handle_rx: oneshot::Receiver<ProducerHandle>,
    ) -> SharedFetch {
        let key = key.to_string();
        let inflight = Arc::clone(&self.inflight);
        let counters = Arc::clone(&self.counters);

        async move {
            let reason = match handle_rx.await {
                Ok(handle) => match handle.await {
                    Ok(result) => return result,
                    Err(e) => e.to_string(),
                },
                Err(_) => {
                    inflight.remove_if(&key, |_, flight| flight.id == id);
                    "producer task was never started".to_string()
                }
            };

            Counters::bump(&counters.producer_failures);
            warn!(key = %key, reason = %reason, "Producer task did not complete");
            Err(FetchFailure::new(
                &key,
                CacheError::ProducerAborted { key: key.clone() },
            ))
        }
        .boxed()
        .shared()
    }
}

/// Body of the spawned producer task for one in-flight key.
async fn produce_and_store<T, E, F, Fut>(
    store: Arc<dyn CacheStore>,
    counters: Arc<Counters>,
    guard: FlightGuard,
    ttl: Duration,
    producer: F,
) -> Result<Value, FetchFailure>
where
    T: Serialize + Send + 'static,
    E: StdError + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let key = guard.key.as_str();

    // Another flight may have stored the value between our miss and our marker.
    if let Ok(Some(payload)) = store.get(key).await {
        if let Ok(json) = serde_json::from_str::<Value>(&payload) {
            return Ok(json);
        }
    }

    Counters::bump(&counters.producer_calls);
    let outcome = match producer().await {
        Ok(value) => match serde_json::to_value(&value) {
            Ok(json) => {
                if let Err(e) = store.set(key, json.to_string(), ttl).await {
                    warn!(store = store.name(), key = %key, error = %e, "Cache write failed");
                }
                Ok(json)
            }
            Err(source) => Err(FetchFailure::new(
                key,
                CacheError::Encode {
                    key: key.to_string(),
                    source,
                },
            )),
        },
        Err(e) => {
            Counters::bump(&counters.producer_failures);
            warn!(key = %key, error = %e, "Producer failed, nothing cached");
            Err(FetchFailure::new(key, e))
        }
    };

    // The marker is released when `guard` drops, after the value is stored.
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, NoOpStore};
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    fn fetcher() -> CachedFetcher {
        CachedFetcher::new(Arc::new(MemoryStore::new()))
    }

    fn counting(
        calls: &Arc<AtomicUsize>,
        value: u64,
    ) -> impl FnOnce() -> futures::future::Ready<Result<u64, Boom>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(value))
        }
    }

    #[tokio::test]
    async fn miss_then_hit_invokes_producer_once() {
        let fetcher = fetcher();
        let key = CacheKey::new("account:alice.near");
        let calls = Arc::new(AtomicUsize::new(0));

        let first = fetcher.fetch(&key, Duration::from_secs(10), counting(&calls, 7)).await;
        assert!(matches!(first, Fetched::Fresh(7)));

        let second = fetcher.fetch(&key, Duration::from_secs(10), counting(&calls, 8)).await;
        assert!(matches!(second, Fetched::Hit(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.inflight_count(), 0);
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let fetcher = fetcher();
        let key = CacheKey::new("account:alice.near:view");

        let failed: Fetched<u64> = fetcher
            .fetch(&key, Duration::from_secs(10), || async { Err::<u64, _>(Boom) })
            .await;
        let failure = failed.into_result().unwrap_err();
        assert_eq!(failure.key(), "account:alice.near:view");
        assert_eq!(failure.reason().to_string(), "boom");

        let calls = Arc::new(AtomicUsize::new(0));
        let retried = fetcher.fetch(&key, Duration::from_secs(10), counting(&calls, 3)).await;
        assert!(matches!(retried, Fetched::Fresh(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = fetcher.stats();
        assert_eq!(stats.producer_failures, 1);
        assert_eq!(stats.producer_calls, 2);
    }

    #[tokio::test]
    async fn noop_store_always_produces() {
        let fetcher = CachedFetcher::new(Arc::new(NoOpStore));
        let key = CacheKey::new("k");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let fetched = fetcher.fetch(&key, Duration::from_secs(10), counting(&calls, 1)).await;
            assert!(!fetched.is_hit());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn fetched_helpers() {
        let hit = Fetched::Hit(2).map(|v| v * 2);
        assert!(hit.is_hit());
        assert_eq!(hit.into_option(), Some(4));

        let unavailable: Fetched<u8> = Fetched::Unavailable(FetchFailure::new("k", Boom));
        assert!(unavailable.is_unavailable());
        assert_eq!(unavailable.into_option(), None);
    }
}
