// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bounded memoization cache with LRU eviction and TTL expiry

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use super::{CacheConfig, CacheEntry, EstimateSize};
use crate::error::{CacheError, CacheResult};

pub(crate) const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Point-in-time cache metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub cache_size: usize,
    pub max_size: usize,
    pub evictions: u64,
    pub memory_usage_bytes: usize,
    pub memory_usage_mb: f64,
}

/// Everything guarded by the cache lock
#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency index: sequence -> key, oldest first
    recency: BTreeMap<u64, String>,
    next_sequence: u64,
    max_size: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> CacheState<V> {
    fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_sequence: 0,
            max_size,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn bump_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.sequence);
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        self.evictions += 1;
        Some(key)
    }

    fn purge_expired(&mut self, default_ttl: Duration) -> usize {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(default_ttl))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        expired.len()
    }
}

/// Thread-safe key/value cache bounded by entry count.
///
/// Reads that find an entry older than its TTL purge it and count as a miss.
/// Inserting into a full cache evicts the least recently accessed entry.
pub struct IntelligentCache<V> {
    state: Mutex<CacheState<V>>,
    ttl: Duration,
    estimate_memory: bool,
}

impl<V> std::fmt::Debug for IntelligentCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("IntelligentCache")
            .field("size", &state.entries.len())
            .field("max_size", &state.max_size)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V: Clone + EstimateSize> IntelligentCache<V> {
    /// Create a new cache, rejecting non-positive capacity or TTL
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        config
            .validate()
            .map_err(CacheError::InvalidConfiguration)?;

        Ok(Self {
            state: Mutex::new(CacheState::new(config.max_size)),
            ttl: config.ttl,
            estimate_memory: config.estimate_memory,
        })
    }

    pub fn with_capacity(max_size: usize, ttl: Duration) -> CacheResult<Self> {
        Self::new(CacheConfig::new(max_size, ttl))
    }

    /// Look up a live entry, refreshing its recency on a hit
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            None => {
                state.misses += 1;
                log::trace!("Cache miss: {}", key);
                return None;
            }
            Some(entry) => entry.is_expired(self.ttl),
        };

        if expired {
            state.remove(key);
            state.misses += 1;
            log::debug!("Cache entry expired: {}", key);
            return None;
        }

        let sequence = state.bump_sequence();
        state.hits += 1;

        let entry = state.entries.get_mut(key)?;
        let previous = entry.sequence;
        entry.update_access(sequence);
        let value = entry.value.clone();

        state.recency.remove(&previous);
        state.recency.insert(sequence, key.to_string());

        Some(value)
    }

    /// Insert a value using the cache-wide TTL
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.insert(key.into(), value, None);
    }

    /// Insert a value with its own TTL
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.insert(key.into(), value, Some(ttl));
    }

    fn insert(&self, key: String, value: V, ttl: Option<Duration>) {
        let mut state = self.state.lock();

        // Overwrites replace in place and never trigger eviction
        if state.remove(&key).is_none() {
            while state.entries.len() >= state.max_size {
                match state.evict_lru() {
                    Some(evicted) => log::debug!("Evicted LRU cache entry: {}", evicted),
                    None => break,
                }
            }
        }

        let sequence = state.bump_sequence();
        state.recency.insert(sequence, key.clone());
        state
            .entries
            .insert(key.clone(), CacheEntry::new(key, value, ttl, sequence));
    }

    /// Remove a key, returning whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        self.state.lock().remove(key).is_some()
    }

    /// Remove all entries and reset every counter
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let max_size = state.max_size;
        *state = CacheState::new(max_size);
    }

    /// Sweep every expired entry, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.state.lock().purge_expired(self.ttl);
        if removed > 0 {
            log::debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// Release spare map capacity left behind by evictions and purges
    pub fn shrink_to_fit(&self) {
        let mut state = self.state.lock();
        state.entries.shrink_to_fit();
    }

    /// Change the capacity, evicting LRU entries if the cache is now over it
    pub fn resize(&self, max_size: usize) -> CacheResult<()> {
        if max_size == 0 {
            return Err(CacheError::InvalidConfiguration(
                "Cache max_size must be > 0".to_string(),
            ));
        }

        let mut state = self.state.lock();
        state.max_size = max_size;
        while state.entries.len() > max_size {
            if state.evict_lru().is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Whether a live entry exists; does not count as a request
    pub fn contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(self.ttl))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.state.lock().max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Snapshot hit/miss rates, size and a best-effort memory estimate
    pub fn get_metrics(&self) -> CacheMetrics {
        let state = self.state.lock();
        let total_requests = state.hits + state.misses;

        let (hit_rate, miss_rate) = if total_requests == 0 {
            (0.0, 0.0)
        } else {
            let hit_rate = state.hits as f64 / total_requests as f64;
            (hit_rate, 1.0 - hit_rate)
        };

        let memory_usage_bytes = if self.estimate_memory {
            Self::estimate_memory(&state)
        } else {
            0
        };

        CacheMetrics {
            hit_rate,
            miss_rate,
            total_requests,
            hits: state.hits,
            misses: state.misses,
            cache_size: state.entries.len(),
            max_size: state.max_size,
            evictions: state.evictions,
            memory_usage_bytes,
            memory_usage_mb: memory_usage_bytes as f64 / BYTES_PER_MB,
        }
    }

    fn estimate_memory(state: &CacheState<V>) -> usize {
        catch_unwind(AssertUnwindSafe(|| {
            state
                .entries
                .values()
                .map(|entry| entry.key.capacity() + entry.value.estimate_size())
                .sum::<usize>()
        }))
        .unwrap_or_else(|_| {
            log::warn!("Cache memory estimate failed; reporting 0");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn cache(max_size: usize) -> IntelligentCache<i64> {
        IntelligentCache::with_capacity(max_size, Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let cache = cache(10);
        cache.set("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_lru_eviction_scenario() {
        let cache = cache(2);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3);

        assert!(!cache.contains("b"));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_metrics().evictions, 1);
    }

    #[test]
    fn test_eviction_ties_follow_insertion_order() {
        let cache = cache(3);
        cache.set("first", 1);
        cache.set("second", 2);
        cache.set("third", 3);
        cache.set("fourth", 4);

        assert!(!cache.contains("first"));
        assert!(cache.contains("second"));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = cache(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get_metrics().evictions, 0);
    }

    #[test]
    fn test_ttl_expiry_is_lazy() {
        let cache: IntelligentCache<i64> =
            IntelligentCache::with_capacity(10, Duration::from_millis(30)).unwrap();
        cache.set("x", 7);
        assert_eq!(cache.len(), 1);

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("x"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_per_entry_ttl() {
        let cache = cache(10);
        cache.set_with_ttl("short", 1, Duration::from_millis(20));
        cache.set("long", 2);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[test]
    fn test_metrics_rates() {
        let cache = cache(10);
        let empty = cache.get_metrics();
        assert_eq!(empty.hit_rate, 0.0);
        assert_eq!(empty.miss_rate, 0.0);

        assert_eq!(cache.get("missing"), None);
        cache.set("missing", 5);
        assert_eq!(cache.get("missing"), Some(5));

        let metrics = cache.get_metrics();
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.hit_rate, 0.5);
        assert_eq!(metrics.hit_rate + metrics.miss_rate, 1.0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let cache = cache(10);
        cache.set("a", 1);
        cache.get("a");
        cache.get("b");

        cache.clear();
        let expected = CacheMetrics {
            max_size: 10,
            ..CacheMetrics::default()
        };
        assert_eq!(cache.get_metrics(), expected);
        cache.clear();
        assert_eq!(cache.get_metrics().total_requests, 0);
        assert_eq!(cache.get_metrics().cache_size, 0);
    }

    #[test]
    fn test_invalidate() {
        let cache = cache(10);
        cache.set("a", 1);
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_resize_shrinks_from_lru_end() {
        let cache = cache(4);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            cache.set(*key, i as i64);
        }
        cache.get("a");

        cache.resize(2).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(cache.contains("d"));
        assert!(cache.resize(0).is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result: CacheResult<IntelligentCache<i64>> =
            IntelligentCache::with_capacity(0, Duration::from_secs(1));
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_memory_estimate_tracks_values() {
        let cache: IntelligentCache<String> =
            IntelligentCache::with_capacity(10, Duration::from_secs(60)).unwrap();
        cache.set("big", "x".repeat(10_000));
        assert!(cache.get_metrics().memory_usage_bytes >= 10_000);
    }

    #[test]
    fn test_non_estimable_values_report_zero() {
        #[derive(Clone)]
        struct Opaque;
        impl EstimateSize for Opaque {}

        let cache: IntelligentCache<Opaque> =
            IntelligentCache::with_capacity(10, Duration::from_secs(60)).unwrap();
        cache.set("k", Opaque);
        assert!(cache.get_metrics().memory_usage_bytes < 16);
    }
}
