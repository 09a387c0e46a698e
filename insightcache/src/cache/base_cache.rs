// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Category-keyed base caches for session data
//!
//! The base cache is owned by the hosting application. It stores values per
//! category, session, operation and parameter set, and manages its own
//! synchronization. [`InMemoryBaseCache`] is the bundled implementation;
//! [`NullBaseCache`] stores nothing and is used when caching is disabled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{generate_key, CacheConfig, EstimateSize, IntelligentCache};
use crate::dataset::DataFrame;
use crate::error::{CacheError, CacheResult};

/// Parameters distinguishing cached results of the same operation
pub type Parameters = BTreeMap<String, serde_json::Value>;

/// Kind of data stored in the base cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheCategory {
    DataFrame,
    Analysis,
    Chart,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 3] = [
        CacheCategory::DataFrame,
        CacheCategory::Analysis,
        CacheCategory::Chart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::DataFrame => "dataframe",
            CacheCategory::Analysis => "analysis",
            CacheCategory::Chart => "chart",
        }
    }
}

impl std::fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheCategory {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dataframe" => Ok(CacheCategory::DataFrame),
            "analysis" => Ok(CacheCategory::Analysis),
            "chart" => Ok(CacheCategory::Chart),
            other => Err(CacheError::BaseCache(format!(
                "Unknown cache category: {}",
                other
            ))),
        }
    }
}

/// A value stored in the base cache
#[derive(Debug, Clone, PartialEq)]
pub enum CacheItem {
    /// Tabular working data
    Dataset(DataFrame),
    /// Analysis results and chart specifications
    Document(serde_json::Value),
    /// Rendered chart payloads
    Bytes(Vec<u8>),
}

impl CacheItem {
    pub fn as_dataset(&self) -> Option<&DataFrame> {
        match self {
            CacheItem::Dataset(frame) => Some(frame),
            _ => None,
        }
    }
}

impl EstimateSize for CacheItem {
    fn estimate_size(&self) -> usize {
        match self {
            CacheItem::Dataset(frame) => frame.estimate_size(),
            CacheItem::Document(value) => value.estimate_size(),
            CacheItem::Bytes(bytes) => bytes.len(),
        }
    }
}

/// Base cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseCacheStats {
    pub entries: BTreeMap<CacheCategory, usize>,
    pub total_entries: usize,
    pub memory_bytes: usize,
    pub max_memory_bytes: usize,
    pub disk_bytes: usize,
    pub max_disk_bytes: usize,
    pub memory_usage_percent: f64,
    pub disk_usage_percent: f64,
    pub hits: u64,
    pub misses: u64,
}

/// Capability interface for the host-owned domain cache
pub trait BaseCache: Send + Sync {
    fn get(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        parameters: &Parameters,
    ) -> CacheResult<Option<CacheItem>>;

    fn set(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        value: CacheItem,
        parameters: &Parameters,
        ttl: Duration,
    ) -> CacheResult<()>;

    fn stats(&self) -> CacheResult<BaseCacheStats>;

    fn clear_all(&self) -> CacheResult<()>;
}

/// Base cache holding one bounded LRU/TTL cache per category
pub struct InMemoryBaseCache {
    dataframes: IntelligentCache<CacheItem>,
    analyses: IntelligentCache<CacheItem>,
    charts: IntelligentCache<CacheItem>,
    max_memory_bytes: usize,
}

impl InMemoryBaseCache {
    /// Create a base cache; `config` sizes each category partition
    pub fn new(config: CacheConfig, max_memory_bytes: usize) -> CacheResult<Self> {
        if max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfiguration(
                "Base cache max_memory_bytes must be > 0".to_string(),
            ));
        }

        Ok(Self {
            dataframes: IntelligentCache::new(config.clone())?,
            analyses: IntelligentCache::new(config.clone())?,
            charts: IntelligentCache::new(config)?,
            max_memory_bytes,
        })
    }

    fn partition(&self, category: CacheCategory) -> &IntelligentCache<CacheItem> {
        match category {
            CacheCategory::DataFrame => &self.dataframes,
            CacheCategory::Analysis => &self.analyses,
            CacheCategory::Chart => &self.charts,
        }
    }

    /// Storage key for a category/session/operation/parameters tuple
    pub fn storage_key(
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        parameters: &Parameters,
    ) -> CacheResult<String> {
        let identity = format!("{}:{}:{}", category, session_id, operation);
        generate_key(&identity, parameters, &())
    }
}

impl BaseCache for InMemoryBaseCache {
    fn get(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        parameters: &Parameters,
    ) -> CacheResult<Option<CacheItem>> {
        let key = Self::storage_key(category, session_id, operation, parameters)?;
        Ok(self.partition(category).get(&key))
    }

    fn set(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        value: CacheItem,
        parameters: &Parameters,
        ttl: Duration,
    ) -> CacheResult<()> {
        let key = Self::storage_key(category, session_id, operation, parameters)?;
        self.partition(category).set_with_ttl(key, value, ttl);
        Ok(())
    }

    fn stats(&self) -> CacheResult<BaseCacheStats> {
        let mut stats = BaseCacheStats {
            max_memory_bytes: self.max_memory_bytes,
            ..BaseCacheStats::default()
        };

        for category in CacheCategory::ALL {
            let metrics = self.partition(category).get_metrics();
            stats.entries.insert(category, metrics.cache_size);
            stats.total_entries += metrics.cache_size;
            stats.memory_bytes += metrics.memory_usage_bytes;
            stats.hits += metrics.hits;
            stats.misses += metrics.misses;
        }

        stats.memory_usage_percent =
            stats.memory_bytes as f64 / self.max_memory_bytes as f64 * 100.0;

        Ok(stats)
    }

    fn clear_all(&self) -> CacheResult<()> {
        for category in CacheCategory::ALL {
            self.partition(category).clear();
        }
        Ok(())
    }
}

/// Base cache that stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBaseCache;

impl BaseCache for NullBaseCache {
    fn get(
        &self,
        _category: CacheCategory,
        _session_id: &str,
        _operation: &str,
        _parameters: &Parameters,
    ) -> CacheResult<Option<CacheItem>> {
        Ok(None)
    }

    fn set(
        &self,
        _category: CacheCategory,
        _session_id: &str,
        _operation: &str,
        _value: CacheItem,
        _parameters: &Parameters,
        _ttl: Duration,
    ) -> CacheResult<()> {
        Ok(())
    }

    fn stats(&self) -> CacheResult<BaseCacheStats> {
        Ok(BaseCacheStats::default())
    }

    fn clear_all(&self) -> CacheResult<()> {
        Ok(())
    }
}
