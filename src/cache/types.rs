// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache statistics and access bookkeeping types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics about cache store performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (live entry returned)
    pub hits: u64,
    /// Number of cache misses (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted due to size limits
    pub evictions: u64,
    /// Number of entries expired due to TTL
    pub expirations: u64,
    /// Current number of entries in the store
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Producer-side counters kept by [`crate::cache::CachedFetcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetcherStats {
    /// Calls answered from the store without touching the producer
    pub hits: u64,
    /// Calls that found no live entry
    pub misses: u64,
    /// Producer invocations
    pub producer_calls: u64,
    /// Producer failures (never cached)
    pub producer_failures: u64,
    /// Misses that joined an in-flight producer instead of starting one
    pub coalesced: u64,
}

/// Monotonic sequence number for deterministic LRU ordering
///
/// When several entries are touched within the same clock tick, the sequence
/// number breaks the tie. Lower sequence numbers are older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) struct AccessSequence(u64);

impl AccessSequence {
    /// Returns the next sequence number
    pub(crate) fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_of_empty_stats_is_zero() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_counts_hits_over_lookups() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
        assert!(stats.to_string().contains("hit_rate=75.0%"));
    }

    #[test]
    fn access_sequence_next_saturating() {
        let seq = AccessSequence(u64::MAX);
        assert_eq!(seq.next(), AccessSequence(u64::MAX));
        assert!(AccessSequence(5) < AccessSequence(5).next());
    }
}
