// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Analytics and adaptive TTL layer in front of a base cache
//!
//! The manager never owns cached data. It forwards reads and writes to the
//! injected [`BaseCache`], tracks per-key access counts and latencies, picks
//! TTLs from category defaults and value size, and shrinks datasets through
//! the [`OptimizationEngine`] before they are stored. Analytics failures
//! never fail a read or a write.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::base_cache::{BaseCache, BaseCacheStats, CacheCategory, CacheItem, Parameters};
use super::cache_config::ManagerConfig;
use crate::error::{CacheError, CacheResult};
use crate::optimizer::OptimizationEngine;

/// A key and how often it was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAccess {
    pub key: String,
    pub access_count: u64,
}

/// Per-key access profile included in exported reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPattern {
    pub access_count: u64,
    pub avg_access_time_ms: f64,
    pub last_access: DateTime<Utc>,
}

/// Combined view of base cache statistics and tracked access analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedCacheMetrics {
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub total_requests: u64,
    pub avg_access_time_ms: f64,
    pub memory_usage_bytes: usize,
    pub memory_usage_percent: f64,
    pub disk_usage_bytes: usize,
    pub disk_usage_percent: f64,
    pub total_entries: usize,
    pub hot_keys: Vec<KeyAccess>,
    pub cold_keys: Vec<KeyAccess>,
}

/// Advisory outcome of [`EnhancedCacheManager::optimize_cache_configuration`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfigAnalysis {
    pub analyzed_at: DateTime<Utc>,
    pub memory_usage_percent: f64,
    pub disk_usage_percent: f64,
    pub recommendations: Vec<String>,
    pub cold_keys_found: usize,
    pub cold_keys_removed: usize,
}

/// JSON report written by [`EnhancedCacheManager::export_report`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheReport {
    pub timestamp: DateTime<Utc>,
    pub enhanced_metrics: EnhancedCacheMetrics,
    pub optimization_analysis: CacheConfigAnalysis,
    pub access_patterns: BTreeMap<String, AccessPattern>,
}

#[derive(Debug)]
struct KeyStats {
    access_count: u64,
    access_times: VecDeque<Duration>,
    last_access: DateTime<Utc>,
}

impl KeyStats {
    fn avg_access_time_ms(&self) -> f64 {
        if self.access_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.access_times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.access_times.len() as f64
    }
}

#[derive(Debug, Default)]
struct AnalyticsState {
    keys: HashMap<String, KeyStats>,
    hits: u64,
    misses: u64,
}

impl AnalyticsState {
    fn record(&mut self, key: String, elapsed: Duration, hit: bool, window: usize) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        let stats = self.keys.entry(key).or_insert_with(|| KeyStats {
            access_count: 0,
            access_times: VecDeque::new(),
            last_access: Utc::now(),
        });
        stats.access_count += 1;
        stats.last_access = Utc::now();
        stats.access_times.push_back(elapsed);
        while stats.access_times.len() > window {
            stats.access_times.pop_front();
        }
    }

    /// Keys ordered hottest first; equal counts order by key
    fn ranked(&self) -> Vec<KeyAccess> {
        let mut ranked: Vec<KeyAccess> = self
            .keys
            .iter()
            .map(|(key, stats)| KeyAccess {
                key: key.clone(),
                access_count: stats.access_count,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        ranked
    }

    fn avg_access_time_ms(&self) -> f64 {
        let (total, samples) = self
            .keys
            .values()
            .flat_map(|stats| stats.access_times.iter())
            .fold((Duration::ZERO, 0usize), |(total, n), t| (total + *t, n + 1));

        if samples == 0 {
            0.0
        } else {
            total.as_secs_f64() * 1000.0 / samples as f64
        }
    }
}

/// Analytics layer over an injected base cache
pub struct EnhancedCacheManager {
    base: Arc<dyn BaseCache>,
    engine: Arc<OptimizationEngine<CacheItem>>,
    config: ManagerConfig,
    analytics: Mutex<AnalyticsState>,
}

impl EnhancedCacheManager {
    pub fn new(
        base: Arc<dyn BaseCache>,
        engine: Arc<OptimizationEngine<CacheItem>>,
        config: ManagerConfig,
    ) -> CacheResult<Self> {
        config
            .validate()
            .map_err(CacheError::InvalidConfiguration)?;

        Ok(Self {
            base,
            engine,
            config,
            analytics: Mutex::new(AnalyticsState::default()),
        })
    }

    pub fn base(&self) -> &Arc<dyn BaseCache> {
        &self.base
    }

    pub fn engine(&self) -> &Arc<OptimizationEngine<CacheItem>> {
        &self.engine
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn analytics_key(category: CacheCategory, session_id: &str, operation: &str) -> String {
        format!("{}:{}:{}", category, session_id, operation)
    }

    /// Read from the base cache, recording latency and access counts.
    ///
    /// A base cache error is logged and reported as a miss.
    pub fn get_with_analytics(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        parameters: &Parameters,
    ) -> Option<CacheItem> {
        let started = Instant::now();
        let item = match self.base.get(category, session_id, operation, parameters) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("Base cache read failed for {}: {}", operation, e);
                None
            }
        };
        let elapsed = started.elapsed();

        let key = Self::analytics_key(category, session_id, operation);
        let hit = item.is_some();
        let window = self.config.access_time_window;
        let recorded = catch_unwind(AssertUnwindSafe(|| {
            self.analytics.lock().record(key, elapsed, hit, window);
        }));
        if recorded.is_err() {
            log::warn!("Access analytics skipped for {}", operation);
        }

        item
    }

    /// Store a value, optimizing datasets first and choosing a TTL when none
    /// is given.
    ///
    /// If the optimized write fails the raw value is stored again with the
    /// category default TTL; only that second failure is returned.
    pub fn set_with_optimization(
        &self,
        category: CacheCategory,
        session_id: &str,
        operation: &str,
        value: CacheItem,
        parameters: &Parameters,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let ttl = ttl.unwrap_or_else(|| self.compute_smart_ttl(category, operation, &value));

        let prepared = match &value {
            CacheItem::Dataset(frame) => {
                let (optimized, result) = self.engine.optimize_tabular_data(frame);
                if result.success {
                    log::debug!(
                        "Optimized dataset for {}: {:.2}MB saved",
                        operation,
                        result.memory_saved_mb
                    );
                }
                CacheItem::Dataset(optimized)
            }
            other => other.clone(),
        };

        match self
            .base
            .set(category, session_id, operation, prepared, parameters, ttl)
        {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!(
                    "Optimized write failed for {}: {}; storing raw value",
                    operation,
                    e
                );
                self.base.set(
                    category,
                    session_id,
                    operation,
                    value,
                    parameters,
                    self.config.default_ttl(category),
                )
            }
        }
    }

    /// Pick a TTL from the category default, the value's size and the kind of
    /// operation; always within `[min_ttl, max_ttl]`
    pub fn compute_smart_ttl(
        &self,
        category: CacheCategory,
        operation: &str,
        value: &CacheItem,
    ) -> Duration {
        let mut seconds = self.config.default_ttl(category).as_secs_f64();

        if let Some(frame) = value.as_dataset() {
            let bytes = frame.memory_usage_bytes();
            if bytes > self.config.large_value_bytes {
                seconds *= 2.0;
            } else if bytes < self.config.small_value_bytes {
                seconds *= 0.5;
            }
        }

        let operation = operation.to_lowercase();
        if operation.contains("filter") {
            seconds *= 0.5;
        }
        if operation.contains("aggregate") {
            seconds *= 1.5;
        }

        let seconds = seconds.clamp(
            self.config.min_ttl.as_secs_f64(),
            self.config.max_ttl.as_secs_f64(),
        );
        Duration::from_secs_f64(seconds)
    }

    fn base_stats(&self) -> BaseCacheStats {
        self.base.stats().unwrap_or_else(|e| {
            log::warn!("Base cache stats unavailable: {}", e);
            BaseCacheStats::default()
        })
    }

    pub fn get_enhanced_metrics(&self) -> EnhancedCacheMetrics {
        let stats = self.base_stats();
        let analytics = self.analytics.lock();

        let total_requests = analytics.hits + analytics.misses;
        let (hit_rate, miss_rate) = if total_requests == 0 {
            (0.0, 0.0)
        } else {
            let hit_rate = analytics.hits as f64 / total_requests as f64;
            (hit_rate, 1.0 - hit_rate)
        };

        let ranked = analytics.ranked();
        let hot_keys = ranked
            .iter()
            .take(self.config.hot_key_limit)
            .cloned()
            .collect();
        let cold_keys = ranked
            .iter()
            .rev()
            .filter(|k| k.access_count > 0)
            .take(self.config.cold_key_limit)
            .cloned()
            .collect();

        EnhancedCacheMetrics {
            hit_rate,
            miss_rate,
            total_requests,
            avg_access_time_ms: analytics.avg_access_time_ms(),
            memory_usage_bytes: stats.memory_bytes,
            memory_usage_percent: stats.memory_usage_percent,
            disk_usage_bytes: stats.disk_bytes,
            disk_usage_percent: stats.disk_usage_percent,
            total_entries: stats.total_entries,
            hot_keys,
            cold_keys,
        }
    }

    /// Produce sizing advice from base cache utilization and prune analytics
    /// for rarely read keys. The base cache itself is never modified.
    pub fn optimize_cache_configuration(&self) -> CacheConfigAnalysis {
        let stats = self.base_stats();
        let mut recommendations = Vec::new();

        if stats.memory_usage_percent > 95.0 {
            recommendations.push(format!(
                "Memory cache is {:.1}% full; increase memory cache size",
                stats.memory_usage_percent
            ));
        } else if stats.memory_usage_percent < 30.0 {
            recommendations.push(format!(
                "Memory cache is only {:.1}% used; it may be oversized",
                stats.memory_usage_percent
            ));
        }

        if stats.disk_usage_percent > 90.0 {
            recommendations.push(format!(
                "Disk cache is {:.1}% full; increase disk cache size",
                stats.disk_usage_percent
            ));
        }

        let mut analytics = self.analytics.lock();
        let threshold = self.config.cold_access_threshold;
        let cold: Vec<String> = analytics
            .keys
            .iter()
            .filter(|(_, stats)| stats.access_count <= threshold)
            .map(|(key, _)| key.clone())
            .collect();

        let cold_keys_found = cold.len();
        let mut cold_keys_removed = 0;
        if cold_keys_found > self.config.cold_key_cleanup_threshold {
            for key in &cold {
                analytics.keys.remove(key);
            }
            cold_keys_removed = cold_keys_found;
            log::info!("Dropped analytics for {} cold keys", cold_keys_removed);
        }

        CacheConfigAnalysis {
            analyzed_at: Utc::now(),
            memory_usage_percent: stats.memory_usage_percent,
            disk_usage_percent: stats.disk_usage_percent,
            recommendations,
            cold_keys_found,
            cold_keys_removed,
        }
    }

    fn access_patterns(&self) -> BTreeMap<String, AccessPattern> {
        self.analytics
            .lock()
            .keys
            .iter()
            .map(|(key, stats)| {
                (
                    key.clone(),
                    AccessPattern {
                        access_count: stats.access_count,
                        avg_access_time_ms: stats.avg_access_time_ms(),
                        last_access: stats.last_access,
                    },
                )
            })
            .collect()
    }

    /// Build a report and write it as pretty-printed JSON to `path`
    pub fn export_report<P: AsRef<Path>>(&self, path: P) -> CacheResult<CacheReport> {
        let enhanced_metrics = self.get_enhanced_metrics();
        let access_patterns = self.access_patterns();
        let optimization_analysis = self.optimize_cache_configuration();

        let report = CacheReport {
            timestamp: Utc::now(),
            enhanced_metrics,
            optimization_analysis,
            access_patterns,
        };

        std::fs::write(path.as_ref(), serde_json::to_string_pretty(&report)?)?;
        log::info!("Cache report written to {}", path.as_ref().display());

        Ok(report)
    }

    pub fn reset_analytics(&self) {
        *self.analytics.lock() = AnalyticsState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, InMemoryBaseCache, NullBaseCache};
    use crate::dataset::{ColumnData, DataFrame};
    use crate::optimizer::OptimizerConfig;
    use crate::system::StaticMetrics;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine() -> Arc<OptimizationEngine<CacheItem>> {
        Arc::new(
            OptimizationEngine::new(
                OptimizerConfig::default(),
                Arc::new(StaticMetrics::with_memory_percent(40.0)),
            )
            .unwrap(),
        )
    }

    fn manager_over(base: Arc<dyn BaseCache>) -> EnhancedCacheManager {
        EnhancedCacheManager::new(base, engine(), ManagerConfig::default()).unwrap()
    }

    fn manager() -> EnhancedCacheManager {
        let base = InMemoryBaseCache::new(CacheConfig::default(), 64 * 1024 * 1024).unwrap();
        manager_over(Arc::new(base))
    }

    fn params(window: u64) -> Parameters {
        let mut params = Parameters::new();
        params.insert("window".to_string(), json!(window));
        params
    }

    /// Fails every read and the first `failures` writes
    struct FlakyBaseCache {
        failures: AtomicUsize,
        stored_ttls: Mutex<Vec<Duration>>,
    }

    impl FlakyBaseCache {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                stored_ttls: Mutex::new(Vec::new()),
            }
        }
    }

    impl BaseCache for FlakyBaseCache {
        fn get(
            &self,
            _category: CacheCategory,
            _session_id: &str,
            _operation: &str,
            _parameters: &Parameters,
        ) -> CacheResult<Option<CacheItem>> {
            Err(CacheError::BaseCache("read failed".to_string()))
        }

        fn set(
            &self,
            _category: CacheCategory,
            _session_id: &str,
            _operation: &str,
            _value: CacheItem,
            _parameters: &Parameters,
            ttl: Duration,
        ) -> CacheResult<()> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(CacheError::BaseCache("write failed".to_string()));
            }
            self.stored_ttls.lock().push(ttl);
            Ok(())
        }

        fn stats(&self) -> CacheResult<BaseCacheStats> {
            Err(CacheError::BaseCache("stats failed".to_string()))
        }

        fn clear_all(&self) -> CacheResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_round_trip_records_analytics() {
        let manager = manager();
        let doc = CacheItem::Document(json!({"fastest_lap": 71.2}));

        assert!(manager
            .get_with_analytics(CacheCategory::Analysis, "s1", "lap_stats", &params(5))
            .is_none());

        manager
            .set_with_optimization(
                CacheCategory::Analysis,
                "s1",
                "lap_stats",
                doc.clone(),
                &params(5),
                None,
            )
            .unwrap();

        assert_eq!(
            manager.get_with_analytics(CacheCategory::Analysis, "s1", "lap_stats", &params(5)),
            Some(doc)
        );

        let metrics = manager.get_enhanced_metrics();
        assert_eq!(metrics.total_requests, 2);
        assert!((metrics.hit_rate - 0.5).abs() < 1e-9);
        assert_eq!(metrics.hot_keys[0].key, "analysis:s1:lap_stats");
        assert_eq!(metrics.hot_keys[0].access_count, 2);
    }

    #[test]
    fn test_datasets_are_optimized_before_storage() {
        let manager = manager();
        let frame = DataFrame::new()
            .with_column("lap", ColumnData::Int64((1..=60).collect()))
            .unwrap();

        manager
            .set_with_optimization(
                CacheCategory::DataFrame,
                "s1",
                "laps",
                CacheItem::Dataset(frame),
                &Parameters::new(),
                None,
            )
            .unwrap();

        let stored = manager
            .get_with_analytics(CacheCategory::DataFrame, "s1", "laps", &Parameters::new())
            .unwrap();
        assert_eq!(
            stored.as_dataset().unwrap().column("lap").unwrap().data,
            ColumnData::UInt8((1..=60).collect())
        );
    }

    #[test]
    fn test_smart_ttl_adjustments() {
        let manager = manager();
        let small = CacheItem::Dataset(DataFrame::new());
        let doc = CacheItem::Document(json!(null));

        // Small dataset halves the 2h default
        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::DataFrame, "load", &small),
            Duration::from_secs(3600)
        );
        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::DataFrame, "filter_laps", &small),
            Duration::from_secs(1800)
        );
        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::Analysis, "aggregate_stints", &doc),
            Duration::from_secs(5400)
        );
        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::Chart, "render", &doc),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn test_smart_ttl_doubles_for_large_datasets() {
        let config = ManagerConfig {
            large_value_bytes: 16,
            small_value_bytes: 8,
            ..ManagerConfig::default()
        };
        let manager = EnhancedCacheManager::new(Arc::new(NullBaseCache), engine(), config).unwrap();
        let frame = DataFrame::new()
            .with_column("lap", ColumnData::Int64((1..=50).collect()))
            .unwrap();
        assert!(frame.memory_usage_bytes() > 16);

        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::DataFrame, "load", &CacheItem::Dataset(frame)),
            Duration::from_secs(14400)
        );
    }

    #[test]
    fn test_smart_ttl_is_clamped() {
        let config = ManagerConfig {
            chart_ttl: Duration::from_secs(400),
            analysis_ttl: Duration::from_secs(30000),
            ..ManagerConfig::default()
        };
        let manager = EnhancedCacheManager::new(Arc::new(NullBaseCache), engine(), config).unwrap();
        let doc = CacheItem::Document(json!(1));

        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::Chart, "filter_filter", &doc),
            Duration::from_secs(300)
        );
        assert_eq!(
            manager.compute_smart_ttl(CacheCategory::Analysis, "aggregate", &doc),
            Duration::from_secs(28800)
        );
    }

    #[test]
    fn test_failed_read_degrades_to_miss() {
        let manager = manager_over(Arc::new(FlakyBaseCache::new(0)));
        assert!(manager
            .get_with_analytics(CacheCategory::Chart, "s1", "plot", &Parameters::new())
            .is_none());
        assert_eq!(manager.get_enhanced_metrics().total_requests, 1);
    }

    #[test]
    fn test_failed_write_falls_back_to_default_ttl() {
        let base = Arc::new(FlakyBaseCache::new(1));
        let manager = manager_over(base.clone());

        manager
            .set_with_optimization(
                CacheCategory::Chart,
                "s1",
                "plot",
                CacheItem::Bytes(vec![1, 2, 3]),
                &Parameters::new(),
                Some(Duration::from_secs(42)),
            )
            .unwrap();

        assert_eq!(*base.stored_ttls.lock(), vec![Duration::from_secs(1800)]);
    }

    #[test]
    fn test_second_write_failure_is_returned() {
        let manager = manager_over(Arc::new(FlakyBaseCache::new(2)));
        let result = manager.set_with_optimization(
            CacheCategory::Chart,
            "s1",
            "plot",
            CacheItem::Bytes(vec![]),
            &Parameters::new(),
            None,
        );
        assert!(matches!(result, Err(CacheError::BaseCache(_))));
    }

    #[test]
    fn test_hot_and_cold_keys() {
        let manager = manager();
        for (operation, reads) in [("a", 5), ("b", 3), ("c", 1), ("d", 2)] {
            for _ in 0..reads {
                manager.get_with_analytics(
                    CacheCategory::Analysis,
                    "s",
                    operation,
                    &Parameters::new(),
                );
            }
        }

        let metrics = manager.get_enhanced_metrics();
        let hot: Vec<&str> = metrics.hot_keys.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(
            hot,
            vec!["analysis:s:a", "analysis:s:b", "analysis:s:d", "analysis:s:c"]
        );
        assert_eq!(metrics.cold_keys[0].key, "analysis:s:c");
        assert_eq!(metrics.cold_keys[0].access_count, 1);
    }

    #[test]
    fn test_cold_key_bookkeeping_is_pruned() {
        let manager = manager();
        for i in 0..6 {
            manager.get_with_analytics(
                CacheCategory::Chart,
                "s",
                &format!("once-{}", i),
                &Parameters::new(),
            );
        }
        for _ in 0..3 {
            manager.get_with_analytics(CacheCategory::Chart, "s", "often", &Parameters::new());
        }

        let analysis = manager.optimize_cache_configuration();
        assert_eq!(analysis.cold_keys_found, 6);
        assert_eq!(analysis.cold_keys_removed, 6);

        let metrics = manager.get_enhanced_metrics();
        assert_eq!(metrics.hot_keys.len(), 1);
        assert_eq!(metrics.hot_keys[0].key, "chart:s:often");
    }

    #[test]
    fn test_few_cold_keys_are_kept() {
        let manager = manager();
        for i in 0..3 {
            manager.get_with_analytics(
                CacheCategory::Chart,
                "s",
                &format!("once-{}", i),
                &Parameters::new(),
            );
        }

        let analysis = manager.optimize_cache_configuration();
        assert_eq!(analysis.cold_keys_found, 3);
        assert_eq!(analysis.cold_keys_removed, 0);
    }

    #[test]
    fn test_underused_memory_is_flagged() {
        let manager = manager();
        let analysis = manager.optimize_cache_configuration();
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("oversized")));
    }

    #[test]
    fn test_stats_failure_yields_zeroed_metrics() {
        let manager = manager_over(Arc::new(FlakyBaseCache::new(0)));
        let metrics = manager.get_enhanced_metrics();
        assert_eq!(metrics.memory_usage_bytes, 0);
        assert_eq!(metrics.total_entries, 0);
    }

    #[test]
    fn test_export_report() {
        let manager = manager();
        manager.get_with_analytics(CacheCategory::Analysis, "s", "stints", &Parameters::new());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = manager.export_report(&path).unwrap();

        assert!(report.access_patterns.contains_key("analysis:s:stints"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for field in [
            "timestamp",
            "enhanced_metrics",
            "optimization_analysis",
            "access_patterns",
        ] {
            assert!(written.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_reset_analytics() {
        let manager = manager();
        manager.get_with_analytics(CacheCategory::Chart, "s", "plot", &Parameters::new());
        manager.reset_analytics();

        let metrics = manager.get_enhanced_metrics();
        assert_eq!(metrics.total_requests, 0);
        assert!(metrics.hot_keys.is_empty());
    }
}
