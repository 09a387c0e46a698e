// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache configuration and policies

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::base_cache::CacheCategory;
use crate::error::{CacheError, CacheResult};

/// Configuration for an [`IntelligentCache`](super::IntelligentCache)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_size: usize,

    /// Default time-to-live for entries
    pub ttl: Duration,

    /// Include a deep size estimate in metrics snapshots
    pub estimate_memory: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(3600), // 1 hour
            estimate_memory: true,
        }
    }
}

impl CacheConfig {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size,
            ttl,
            ..Self::default()
        }
    }

    /// Create configuration optimized for read-heavy workloads
    pub fn read_optimized() -> Self {
        Self {
            max_size: 2000,
            ttl: Duration::from_secs(7200), // 2 hours
            ..Self::default()
        }
    }

    /// Create configuration for memory-constrained environments
    pub fn memory_constrained() -> Self {
        Self {
            max_size: 250,
            ttl: Duration::from_secs(900), // 15 minutes
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("Cache max_size must be > 0".to_string());
        }

        if self.ttl.is_zero() {
            return Err("Cache ttl must be > 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for the [`EnhancedCacheManager`](super::EnhancedCacheManager)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Default TTL for tabular datasets
    pub dataframe_ttl: Duration,

    /// Default TTL for analysis results
    pub analysis_ttl: Duration,

    /// Default TTL for rendered charts
    pub chart_ttl: Duration,

    /// Lower bound for computed TTLs
    pub min_ttl: Duration,

    /// Upper bound for computed TTLs
    pub max_ttl: Duration,

    /// Datasets above this size get a longer TTL
    pub large_value_bytes: usize,

    /// Datasets below this size get a shorter TTL
    pub small_value_bytes: usize,

    /// Number of hot keys reported in metrics
    pub hot_key_limit: usize,

    /// Number of cold keys reported in metrics
    pub cold_key_limit: usize,

    /// Cold-key population above which analytics bookkeeping is dropped
    pub cold_key_cleanup_threshold: usize,

    /// Keys accessed at most this many times count as cold
    pub cold_access_threshold: u64,

    /// Latency samples retained per key
    pub access_time_window: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            dataframe_ttl: Duration::from_secs(7200), // 2 hours
            analysis_ttl: Duration::from_secs(3600),  // 1 hour
            chart_ttl: Duration::from_secs(1800),     // 30 minutes
            min_ttl: Duration::from_secs(300),        // 5 minutes
            max_ttl: Duration::from_secs(28800),      // 8 hours
            large_value_bytes: 100 * 1024 * 1024,     // 100MB
            small_value_bytes: 1024 * 1024,           // 1MB
            hot_key_limit: 10,
            cold_key_limit: 5,
            cold_key_cleanup_threshold: 5,
            cold_access_threshold: 1,
            access_time_window: 100,
        }
    }
}

impl ManagerConfig {
    /// Default TTL for a category before any adjustment
    pub fn default_ttl(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::DataFrame => self.dataframe_ttl,
            CacheCategory::Analysis => self.analysis_ttl,
            CacheCategory::Chart => self.chart_ttl,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_ttl.is_zero() {
            return Err("min_ttl must be > 0".to_string());
        }

        if self.min_ttl > self.max_ttl {
            return Err(format!(
                "min_ttl ({}s) exceeds max_ttl ({}s)",
                self.min_ttl.as_secs(),
                self.max_ttl.as_secs()
            ));
        }

        if self.small_value_bytes > self.large_value_bytes {
            return Err("small_value_bytes must not exceed large_value_bytes".to_string());
        }

        if self.access_time_window == 0 {
            return Err("access_time_window must be > 0".to_string());
        }

        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate().map_err(CacheError::InvalidConfiguration)?;
        Ok(config)
    }
}
