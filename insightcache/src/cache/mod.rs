// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Caching system
//!
//! This module provides:
//! - A bounded memoization cache with LRU eviction and TTL expiry
//! - Category-keyed base caches for session data (datasets, analyses, charts)
//! - An analytics layer with adaptive TTLs in front of a base cache

pub mod base_cache;
pub mod cache_config;
pub mod enhanced_manager;
pub mod intelligent_cache;

pub use base_cache::{
    BaseCache, BaseCacheStats, CacheCategory, CacheItem, InMemoryBaseCache, NullBaseCache,
    Parameters,
};
pub use cache_config::{CacheConfig, ManagerConfig};
pub use enhanced_manager::{
    AccessPattern, CacheConfigAnalysis, CacheReport, EnhancedCacheManager, EnhancedCacheMetrics,
    KeyAccess,
};
pub use intelligent_cache::{CacheMetrics, IntelligentCache};

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{CacheError, CacheResult};

/// A single cached value with its access bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u64,
    /// Overrides the cache-wide TTL for this entry
    pub ttl: Option<Duration>,
    /// Monotonic recency stamp, unique per cache instance
    pub(crate) sequence: u64,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(key: String, value: V, ttl: Option<Duration>, sequence: u64) -> Self {
        let now = Instant::now();
        Self {
            key,
            value,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            ttl,
            sequence,
        }
    }

    pub fn is_expired(&self, default_ttl: Duration) -> bool {
        self.created_at.elapsed() > self.ttl.unwrap_or(default_ttl)
    }

    pub(crate) fn update_access(&mut self, sequence: u64) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
        self.sequence = sequence;
    }
}

/// Best-effort deep size estimate of a cached value, in bytes.
///
/// Implementations must never panic. Types that cannot be measured can rely
/// on the default, which reports zero.
pub trait EstimateSize {
    fn estimate_size(&self) -> usize {
        0
    }
}

macro_rules! impl_estimate_size_for_plain {
    ($($t:ty),*) => {
        $(
            impl EstimateSize for $t {
                fn estimate_size(&self) -> usize {
                    std::mem::size_of::<$t>()
                }
            }
        )*
    };
}

impl_estimate_size_for_plain!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, ()
);

impl EstimateSize for String {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<String>() + self.capacity()
    }
}

impl EstimateSize for &str {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<&str>() + self.len()
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimate_size(&self) -> usize {
        let spare = self.capacity().saturating_sub(self.len()) * std::mem::size_of::<T>();
        std::mem::size_of::<Vec<T>>() + spare + self.iter().map(|v| v.estimate_size()).sum::<usize>()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_size(&self) -> usize {
        match self {
            Some(inner) => inner.estimate_size(),
            None => std::mem::size_of::<Option<T>>(),
        }
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<Arc<T>>() + self.as_ref().estimate_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<Box<T>>() + self.as_ref().estimate_size()
    }
}

impl<A: EstimateSize, B: EstimateSize> EstimateSize for (A, B) {
    fn estimate_size(&self) -> usize {
        self.0.estimate_size() + self.1.estimate_size()
    }
}

impl<K: EstimateSize, V: EstimateSize, S> EstimateSize for HashMap<K, V, S> {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .iter()
                .map(|(k, v)| k.estimate_size() + v.estimate_size())
                .sum::<usize>()
    }
}

impl<K: EstimateSize, V: EstimateSize> EstimateSize for BTreeMap<K, V> {
    fn estimate_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .iter()
                .map(|(k, v)| k.estimate_size() + v.estimate_size())
                .sum::<usize>()
    }
}

impl EstimateSize for serde_json::Value {
    fn estimate_size(&self) -> usize {
        use serde_json::Value;

        let base = std::mem::size_of::<Value>();
        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) => base,
            Value::String(s) => base + s.capacity(),
            Value::Array(items) => base + items.iter().map(|v| v.estimate_size()).sum::<usize>(),
            Value::Object(map) => {
                base + map
                    .iter()
                    .map(|(k, v)| k.capacity() + v.estimate_size())
                    .sum::<usize>()
            }
        }
    }
}

/// Derive a deterministic cache key from a call identity and its arguments.
///
/// Arguments are canonicalized through JSON (object keys are ordered) and
/// hashed with SHA-256, so equal inputs always produce equal keys.
pub fn generate_key<A, K>(identity: &str, args: &A, kwargs: &K) -> CacheResult<String>
where
    A: Serialize + ?Sized,
    K: Serialize + ?Sized,
{
    let args = canonical_json(args)?;
    let kwargs = canonical_json(kwargs)?;

    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update([0u8]);
    hasher.update(args.as_bytes());
    hasher.update([0u8]);
    hasher.update(kwargs.as_bytes());

    Ok(format!("{}:{}", identity, hex::encode(hasher.finalize())))
}

fn canonical_json<T: Serialize + ?Sized>(value: &T) -> CacheResult<String> {
    let value =
        serde_json::to_value(value).map_err(|e| CacheError::KeyGeneration(e.to_string()))?;
    serde_json::to_string(&value).map_err(|e| CacheError::KeyGeneration(e.to_string()))
}
