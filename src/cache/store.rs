// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Key-value store backends for the cache-aside fetcher
//!
//! The fetcher only needs `get` and `set(key, value, ttl)`; expiry is the
//! store's job. Payloads are JSON strings, the same shape an external shared
//! store would hold.
//!
//! - [`MemoryStore`]: in-process store with per-entry TTL and an optional
//!   size bound
//! - [`NoOpStore`]: disables caching (every lookup misses)

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::types::{AccessSequence, CacheStats};
use crate::errors::CacheError;

/// Trait for shared key-value cache stores
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use; `get` and `set` are each
/// expected to be atomic.
///
/// # Error Handling
///
/// Errors are reported to the caller, which treats a failed `get` as a miss and
/// a failed `set` as "not cached". A store failure never fails a request.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live payload for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, expiring `ttl` from now. Overwrites.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Returns current store statistics
    async fn stats(&self) -> CacheStats;

    /// Returns a human-readable name for this store, used in logs
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct StoreEntry {
    payload: String,
    expires_at: Instant,
    last_accessed: Instant,
    access_seq: AccessSequence,
}

impl StoreEntry {
    fn new(payload: String, ttl: Duration, access_seq: AccessSequence) -> Self {
        let now = Instant::now();
        Self {
            payload,
            expires_at: now + ttl,
            last_accessed: now,
            access_seq,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn touch(&mut self, now: Instant, access_seq: AccessSequence) {
        self.last_accessed = now;
        self.access_seq = access_seq;
    }
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    entries: HashMap<String, StoreEntry>,
    stats: CacheStats,
    next_seq: AccessSequence,
}

/// In-memory store with per-entry TTL
///
/// Expired entries are dropped passively when read. An optional entry bound
/// evicts expired entries first and then the least recently used one.
///
/// # Examples
///
/// ```rust
/// use nearscan::cache::{CacheStore, MemoryStore};
/// use std::time::Duration;
///
/// # tokio_test_block_on(async {
/// let store = MemoryStore::new().with_max_entries(10_000);
/// store.set("account:alice.near", "{}".into(), Duration::from_secs(15)).await?;
/// assert!(store.get("account:alice.near").await?.is_some());
/// # Ok::<(), nearscan::CacheError>(())
/// # }).unwrap();
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    max_entries: Option<usize>,
    state: Mutex<MemoryStoreState>,
}

impl MemoryStore {
    /// Creates an unbounded memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of entries held at once
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    /// Makes room for one more entry, preferring to drop expired ones.
    fn evict_one(state: &mut MemoryStoreState, now: Instant) {
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        if !expired.is_empty() {
            for key in expired {
                state.entries.remove(&key);
                state.stats.expirations += 1;
            }
            return;
        }

        let lru_key = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.last_accessed, entry.access_seq))
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            debug!(key = %key, "Evicting LRU cache entry");
            state.entries.remove(&key);
            state.stats.evictions += 1;
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = Instant::now();
        let seq = state.next_seq;

        let expired = match state.entries.get_mut(key) {
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => {
                entry.touch(now, seq);
                let payload = entry.payload.clone();
                state.next_seq = seq.next();
                state.stats.hits += 1;
                debug!(key, "Cache hit (memory)");
                return Ok(Some(payload));
            }
            None => false,
        };

        if expired {
            debug!(key, "Cache entry expired");
            state.entries.remove(key);
            state.stats.expirations += 1;
            state.stats.entries = state.entries.len();
        }
        state.stats.misses += 1;
        debug!(key, "Cache miss (memory)");
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = Instant::now();

        if let Some(max_entries) = self.max_entries {
            while !state.entries.contains_key(key) && state.entries.len() >= max_entries {
                Self::evict_one(state, now);
            }
        }

        debug!(key, ttl_ms = ttl.as_millis() as u64, "Storing entry in memory cache");
        let seq = state.next_seq;
        state.next_seq = seq.next();
        state
            .entries
            .insert(key.to_string(), StoreEntry::new(value, ttl, seq));
        state.stats.entries = state.entries.len();

        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}

/// A store that never holds anything
///
/// Every lookup misses and writes are ignored, so every fetch invokes its
/// producer. Useful for tests and for running without a cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

#[async_trait]
impl CacheStore for NoOpStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();

        assert!(store.get("account:alice.near").await.unwrap().is_none());

        store
            .set("account:alice.near", "\"alice\"".to_string(), TTL)
            .await
            .unwrap();
        let payload = store.get("account:alice.near").await.unwrap();
        assert_eq!(payload.as_deref(), Some("\"alice\""));

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_ttl() {
        let store = MemoryStore::new();
        store.set("k", "1".to_string(), Duration::from_secs(5)).await.unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("k").await.unwrap().is_none());

        let stats = store.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_overwrite_extends_expiry() {
        let store = MemoryStore::new();
        store.set("k", "1".to_string(), Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        store.set("k", "2".to_string(), Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_size_limit_evicts_lru() {
        let store = MemoryStore::new().with_max_entries(3);

        for key in ["a", "b", "c"] {
            store.set(key, key.to_string(), TTL).await.unwrap();
            tokio::time::advance(Duration::from_millis(1)).await;
        }

        // Touch "a" so "b" becomes least recently used
        assert!(store.get("a").await.unwrap().is_some());
        store.set("d", "d".to_string(), TTL).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.evictions, 1);
        assert!(store.get("b").await.unwrap().is_none());
        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("d").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_size_limit_prefers_expired() {
        let store = MemoryStore::new().with_max_entries(2);
        store.set("short", "1".to_string(), Duration::from_secs(1)).await.unwrap();
        store.set("long", "2".to_string(), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        store.set("new", "3".to_string(), TTL).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert!(store.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_noop_store_never_hits() {
        let store = NoOpStore;
        store.set("k", "1".to_string(), TTL).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(store.stats().await, CacheStats::default());
    }
}
