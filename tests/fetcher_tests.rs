// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the cache-aside fetcher
//!
//! These tests validate single-flight suppression, TTL expiry and failure
//! propagation through the public fetcher API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nearscan::cache::{AccountResource, CacheKey, CachedFetcher, CacheStore, MemoryStore};
use nearscan::AccountId;
use tokio::sync::Notify;

fn alice() -> AccountId {
    "alice.near".parse().unwrap()
}

fn key(resource: AccountResource) -> CacheKey {
    CacheKey::account(&alice(), resource)
}

fn memory_fetcher() -> (CachedFetcher, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn CacheStore> = store.clone();
    (CachedFetcher::new(dyn_store), store)
}

/// Concurrent misses on one key share a single producer invocation
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_invoke_producer_once() {
    let (fetcher, _) = memory_fetcher();
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let fetcher = fetcher.clone();
        let calls = calls.clone();
        let release = release.clone();
        handles.push(tokio::spawn(async move {
            let producer = move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                release.notified().await;
                Ok::<_, std::io::Error>(42u32)
            };
            fetcher
                .fetch(&key(AccountResource::Inventory), Duration::from_secs(5), producer)
                .await
                .into_option()
        }));
    }

    // Every caller but the first must have joined before the producer finishes
    while fetcher.stats().coalesced < 15 {
        tokio::task::yield_now().await;
    }
    release.notify_one();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(42));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1, "producer must run exactly once");
    assert_eq!(fetcher.stats().producer_calls, 1);
    assert_eq!(fetcher.inflight_count(), 0);
}

/// Different keys never block each other
#[tokio::test]
async fn test_distinct_keys_produce_independently() {
    let (fetcher, _) = memory_fetcher();
    let calls = Arc::new(AtomicUsize::new(0));

    for resource in [AccountResource::Code, AccountResource::AccessKeys, AccountResource::View] {
        let calls = calls.clone();
        let value = fetcher
            .fetch(&key(resource), Duration::from_secs(5), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::io::Error>(format!("{resource:?}"))
            })
            .await
            .into_option();
        assert_eq!(value, Some(format!("{resource:?}")));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// An entry is served until its TTL elapses, then produced again
#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refreshed() {
    let (fetcher, _) = memory_fetcher();
    let calls = Arc::new(AtomicUsize::new(0));
    let ttl = Duration::from_secs(5);

    let fetch = |calls: Arc<AtomicUsize>| {
        let fetcher = fetcher.clone();
        async move {
            fetcher
                .fetch(&key(AccountResource::View), ttl, move || async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<_, std::io::Error>(n)
                })
                .await
        }
    };

    assert_eq!(fetch(calls.clone()).await.into_option(), Some(1));

    tokio::time::advance(Duration::from_secs(4)).await;
    let second = fetch(calls.clone()).await;
    assert!(second.is_hit());
    assert_eq!(second.into_option(), Some(1));

    tokio::time::advance(Duration::from_secs(2)).await;
    let third = fetch(calls.clone()).await;
    assert!(!third.is_hit());
    assert_eq!(third.into_option(), Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Every coalesced waiter sees the producer's failure and nothing is stored
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_reaches_all_waiters() {
    let (fetcher, store) = memory_fetcher();
    let release = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let fetcher = fetcher.clone();
        let release = release.clone();
        handles.push(tokio::spawn(async move {
            let producer = move || async move {
                release.notified().await;
                Err::<u32, _>(std::io::Error::other("db down"))
            };
            fetcher
                .fetch(&key(AccountResource::Deployments), Duration::from_secs(5), producer)
                .await
        }));
    }

    while fetcher.stats().coalesced < 7 {
        tokio::task::yield_now().await;
    }
    release.notify_one();

    for handle in handles {
        let fetched = handle.await.unwrap();
        let failure = fetched.into_result().unwrap_err();
        assert_eq!(failure.key(), "account:alice.near:deployments");
        assert!(failure.reason().to_string().contains("db down"));
    }

    assert_eq!(fetcher.stats().producer_failures, 1);
    assert_eq!(store.get("account:alice.near:deployments").await.unwrap(), None);
}

/// Dropping the only waiter does not cancel the producer; its value is still stored
#[tokio::test]
async fn test_aborted_caller_does_not_cancel_producer() {
    let (fetcher, store) = memory_fetcher();
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let caller = {
        let fetcher = fetcher.clone();
        let started = started.clone();
        let release = release.clone();
        tokio::spawn(async move {
            fetcher
                .fetch(&key(AccountResource::Tokens), Duration::from_secs(10), move || async move {
                    started.notify_one();
                    release.notified().await;
                    Ok::<_, std::io::Error>(vec!["usdt.near".to_string()])
                })
                .await
        })
    };

    started.notified().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    release.notify_one();
    while fetcher.inflight_count() > 0 {
        tokio::task::yield_now().await;
    }

    let stored = store.get("account:alice.near:tokens").await.unwrap();
    assert_eq!(stored.as_deref(), Some(r#"["usdt.near"]"#));

    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let value = fetcher
        .fetch(&key(AccountResource::Tokens), Duration::from_secs(10), move || async move {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(Vec::<String>::new())
        })
        .await;
    assert!(value.is_hit());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// A panicking producer releases its key; the next call produces again
#[tokio::test]
async fn test_panicked_producer_does_not_pin_the_key() {
    let (fetcher, _) = memory_fetcher();

    let first = fetcher
        .fetch(&key(AccountResource::Code), Duration::from_secs(5), || async {
            if true {
                panic!("producer blew up");
            }
            Ok::<u32, std::io::Error>(0)
        })
        .await;
    assert!(first.is_unavailable());
    assert_eq!(fetcher.inflight_count(), 0);

    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let second = fetcher
        .fetch(&key(AccountResource::Code), Duration::from_secs(5), move || async move {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(7u32)
        })
        .await;

    assert_eq!(second.into_option(), Some(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "retry must invoke the producer");
    assert_eq!(fetcher.stats().producer_failures, 1);
}
