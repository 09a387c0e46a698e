// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache Stack - composition root wiring the caches and the optimizer
//!
//! Hosts build one stack at startup and hand out its components. Nothing in
//! the crate keeps process-wide instances.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::cache::{
    BaseCache, CacheConfig, CacheItem, EnhancedCacheManager, InMemoryBaseCache, ManagerConfig,
};
use crate::error::{CacheError, CacheResult};
use crate::optimizer::{OptimizationEngine, OptimizerConfig};
use crate::system::{SysinfoMetrics, SystemMetricsProvider};

/// Settings for every component in a [`CacheStack`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    pub optimizer: OptimizerConfig,
    pub manager: ManagerConfig,
    pub base_cache: BaseCacheConfig,
}

/// Sizing for the bundled in-memory base cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCacheConfig {
    /// Per-category capacity and default TTL
    pub partition: CacheConfig,

    /// Memory budget used for utilization reporting
    pub max_memory_bytes: usize,
}

impl Default for BaseCacheConfig {
    fn default() -> Self {
        Self {
            partition: CacheConfig::read_optimized(),
            max_memory_bytes: 512 * 1024 * 1024, // 512MB
        }
    }
}

impl StackConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config
            .optimizer
            .validate()
            .and_then(|_| config.manager.validate())
            .and_then(|_| config.base_cache.partition.validate())
            .map_err(CacheError::InvalidConfiguration)?;
        Ok(config)
    }
}

/// The optimization engine and the analytics manager sharing it
pub struct CacheStack {
    engine: Arc<OptimizationEngine<CacheItem>>,
    manager: Arc<EnhancedCacheManager>,
}

impl CacheStack {
    /// Build a stack backed by an in-memory base cache and sysinfo metrics
    pub fn new(config: StackConfig) -> CacheResult<Self> {
        let base = InMemoryBaseCache::new(
            config.base_cache.partition.clone(),
            config.base_cache.max_memory_bytes,
        )?;
        Self::with_components(config, Arc::new(base), Arc::new(SysinfoMetrics::new()))
    }

    /// Build a stack over host-supplied collaborators
    pub fn with_components(
        config: StackConfig,
        base: Arc<dyn BaseCache>,
        system_metrics: Arc<dyn SystemMetricsProvider>,
    ) -> CacheResult<Self> {
        let engine = Arc::new(OptimizationEngine::new(config.optimizer, system_metrics)?);
        let manager = Arc::new(EnhancedCacheManager::new(
            base,
            Arc::clone(&engine),
            config.manager,
        )?);

        log::debug!("Cache stack initialized");

        Ok(Self { engine, manager })
    }

    pub fn engine(&self) -> &Arc<OptimizationEngine<CacheItem>> {
        &self.engine
    }

    pub fn manager(&self) -> &Arc<EnhancedCacheManager> {
        &self.manager
    }

    /// Stop background monitoring; the stack stays usable
    pub fn shutdown(&self) {
        self.engine.stop_continuous_monitoring();
    }
}
