// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-through caching infrastructure.
//!
//! This module provides:
//! - [`CacheStore`]: the narrow get/set/ttl interface to a shared key-value store
//! - [`MemoryStore`] and [`NoOpStore`] store backends
//! - [`CachedFetcher`]: cache-aside fetch with single-flight suppression
//! - [`CacheKey`]: key construction for per-account resources

mod fetcher;
mod keys;
mod store;
mod types;

pub use fetcher::{CachedFetcher, FetchFailure, Fetched};
pub use keys::{AccountResource, CacheKey};
pub use store::{CacheStore, MemoryStore, NoOpStore};
pub use types::{CacheStats, FetcherStats};
