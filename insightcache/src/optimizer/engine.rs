// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Optimization engine: cache tuning, dataset shrinking and monitoring

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use super::monitor::{MonitorHandle, MonitorSignal};
use super::tabular::shrink_dataframe;
use super::{
    MonitorConfig, OptimizationResult, OptimizationSummary, OptimizationType, OptimizerConfig,
    BYTES_PER_MB,
};
use crate::cache::{generate_key, EstimateSize, IntelligentCache};
use crate::dataset::DataFrame;
use crate::error::{CacheError, CacheResult};
use crate::system::SystemMetricsProvider;

/// An object the host wants released during memory cleanup
struct LargeObject {
    name: String,
    _value: Box<dyn Any + Send + Sync>,
}

/// Owns a memoization cache and keeps it, the process and tabular data lean.
///
/// All operations may be called concurrently. At most one monitoring worker
/// runs per engine; it holds only a weak reference, so dropping the last
/// handle to the engine also ends monitoring.
pub struct OptimizationEngine<V> {
    config: OptimizerConfig,
    cache: Arc<IntelligentCache<V>>,
    system_metrics: Arc<dyn SystemMetricsProvider>,
    history: Mutex<Vec<OptimizationResult>>,
    large_objects: Mutex<Vec<LargeObject>>,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl<V> OptimizationEngine<V>
where
    V: Clone + EstimateSize + Send + Sync + 'static,
{
    pub fn new(
        config: OptimizerConfig,
        system_metrics: Arc<dyn SystemMetricsProvider>,
    ) -> CacheResult<Self> {
        config
            .validate()
            .map_err(CacheError::InvalidConfiguration)?;

        let cache = Arc::new(IntelligentCache::new(config.cache.clone())?);

        Ok(Self {
            config,
            cache,
            system_metrics,
            history: Mutex::new(Vec::new()),
            large_objects: Mutex::new(Vec::new()),
            monitor: Mutex::new(None),
        })
    }

    pub fn cache(&self) -> &Arc<IntelligentCache<V>> {
        &self.cache
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Return the cached result for `identity(args)` or compute it.
    ///
    /// Results are stored only when the computation took longer than the
    /// significance threshold. If no key can be derived from `args` the
    /// computation runs uncached.
    pub fn memoize<A, F>(
        &self,
        identity: &str,
        args: &A,
        ttl_override: Option<Duration>,
        compute: F,
    ) -> V
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        let key = match generate_key(identity, args, &()) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Caching bypassed for {}: {}", identity, e);
                return compute();
            }
        };

        if let Some(value) = self.cache.get(&key) {
            return value;
        }

        let started = Instant::now();
        let value = compute();
        let elapsed = started.elapsed();

        if elapsed > self.config.significance_threshold {
            match ttl_override {
                Some(ttl) => self.cache.set_with_ttl(key, value.clone(), ttl),
                None => self.cache.set(key, value.clone()),
            }
            log::debug!("Cached {} after {:?}", identity, elapsed);
        }

        value
    }

    /// Wrap `f` so that slow calls are memoized under `identity`
    pub fn smart_cache<A, F>(
        self: &Arc<Self>,
        identity: impl Into<String>,
        ttl_override: Option<Duration>,
        f: F,
    ) -> impl Fn(&A) -> V
    where
        A: Serialize + ?Sized,
        F: Fn(&A) -> V,
    {
        let engine = Arc::clone(self);
        let identity = identity.into();
        move |args: &A| engine.memoize(&identity, args, ttl_override, || f(args))
    }

    /// Shrink a dataset's in-memory footprint column by column.
    ///
    /// On failure the original dataset is returned together with an
    /// unsuccessful result.
    pub fn optimize_tabular_data(&self, dataset: &DataFrame) -> (DataFrame, OptimizationResult) {
        let started_at = Utc::now();
        let before_bytes = dataset.memory_usage_bytes();

        let (optimized, applied) =
            match shrink_dataframe(dataset, self.config.categorical_ratio) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("Dataset optimization failed: {}", e);
                    let result = OptimizationResult::failed(
                        OptimizationType::TabularData,
                        started_at,
                        &e,
                    );
                    self.record(result.clone());
                    return (dataset.clone(), result);
                }
            };

        let after_bytes = optimized.memory_usage_bytes();
        let saved_bytes = before_bytes.saturating_sub(after_bytes);

        let mut result = OptimizationResult::new(OptimizationType::TabularData, started_at);
        result.success = !applied.is_empty();
        result.memory_saved_mb = saved_bytes as f64 / BYTES_PER_MB;
        result.performance_gain = if before_bytes == 0 {
            0.0
        } else {
            saved_bytes as f64 / before_bytes as f64 * 100.0
        };
        result.applied_optimizations = applied;
        result.completed_at = Utc::now();

        if result.success {
            log::info!(
                "Dataset optimized: {} transforms, {:.2}MB saved",
                result.applied_optimizations.len(),
                result.memory_saved_mb
            );
        }

        self.record(result.clone());
        (optimized, result)
    }

    /// Purge expired entries and grow the cache when the hit rate is poor
    pub fn optimize_caching_config(&self) -> OptimizationResult {
        let started_at = Utc::now();
        let before = self.cache.get_metrics();

        let mut result = OptimizationResult::new(OptimizationType::CachingConfig, started_at);

        let removed = self.cache.cleanup_expired();
        if removed > 0 {
            result
                .applied_optimizations
                .push(format!("Removed {} expired cache entries", removed));
        }

        let metrics = self.cache.get_metrics();

        if metrics.hit_rate < self.config.low_hit_rate
            && metrics.cache_size < self.config.max_cache_size
        {
            let current = metrics.max_size;
            let grown = current.saturating_mul(2).min(self.config.max_cache_size);
            if grown > current {
                if let Err(e) = self.cache.resize(grown) {
                    let result = OptimizationResult::failed(
                        OptimizationType::CachingConfig,
                        started_at,
                        &e,
                    );
                    self.record(result.clone());
                    return result;
                }
                log::info!("Cache max_size increased from {} to {}", current, grown);
                result
                    .applied_optimizations
                    .push(format!("Increased cache max_size from {} to {}", current, grown));
            }
        }

        if metrics.hit_rate < self.config.advisory_hit_rate {
            result.recommendations.push(format!(
                "Cache hit rate is {:.1}%; review cache keys and TTLs for frequently repeated calls",
                metrics.hit_rate * 100.0
            ));
        }

        if metrics.memory_usage_mb > self.config.memory_warning_mb {
            result.recommendations.push(format!(
                "Cache holds {:.1}MB; consider a smaller max_size or shorter TTL",
                metrics.memory_usage_mb
            ));
        }

        let freed = before
            .memory_usage_bytes
            .saturating_sub(metrics.memory_usage_bytes);
        result.memory_saved_mb = freed as f64 / BYTES_PER_MB;
        result.success = true;
        result.completed_at = Utc::now();

        self.record(result.clone());
        result
    }

    /// Release host-registered objects, purge expired entries and compact
    /// the cache; reports process memory freed, never negative
    pub fn memory_cleanup(&self) -> OptimizationResult {
        let started_at = Utc::now();
        let before = self.process_memory_bytes();

        let mut result = OptimizationResult::new(OptimizationType::MemoryCleanup, started_at);

        let released = std::mem::take(&mut *self.large_objects.lock());
        if !released.is_empty() {
            let names: Vec<&str> = released.iter().map(|o| o.name.as_str()).collect();
            result.applied_optimizations.push(format!(
                "Released {} large objects: {}",
                released.len(),
                names.join(", ")
            ));
        }
        drop(released);

        let removed = self.cache.cleanup_expired();
        if removed > 0 {
            result
                .applied_optimizations
                .push(format!("Removed {} expired cache entries", removed));
        }

        self.cache.shrink_to_fit();
        self.history.lock().shrink_to_fit();
        result
            .applied_optimizations
            .push("Compacted cache storage".to_string());

        let after = self.process_memory_bytes();
        let freed = match (before, after) {
            (Some(before), Some(after)) => before.saturating_sub(after),
            _ => 0,
        };

        result.memory_saved_mb = freed as f64 / BYTES_PER_MB;
        result.success = true;
        result.completed_at = Utc::now();

        log::info!("Memory cleanup freed {:.2}MB", result.memory_saved_mb);

        self.record(result.clone());
        result
    }

    fn process_memory_bytes(&self) -> Option<u64> {
        match self.system_metrics.snapshot() {
            Ok(snapshot) => Some(snapshot.process_memory_bytes),
            Err(e) => {
                log::debug!("Process memory unavailable: {}", e);
                None
            }
        }
    }

    /// Hand ownership of a large object to the engine so the next memory
    /// cleanup can drop it
    pub fn register_large_object(
        &self,
        name: impl Into<String>,
        value: Box<dyn Any + Send + Sync>,
    ) {
        self.large_objects.lock().push(LargeObject {
            name: name.into(),
            _value: value,
        });
    }

    pub fn large_object_count(&self) -> usize {
        self.large_objects.lock().len()
    }

    /// Start the background monitoring worker.
    ///
    /// Returns false if a worker is already running, a stopped worker has not
    /// exited yet, or the thread could not be spawned.
    pub fn start_continuous_monitoring(self: &Arc<Self>) -> bool {
        let mut monitor = self.monitor.lock();

        if let Some(handle) = monitor.as_ref() {
            if handle.is_running() {
                if handle.is_stop_requested() {
                    log::warn!("Previous monitoring worker is still exiting");
                } else {
                    log::debug!("Continuous monitoring already running");
                }
                return false;
            }
        }

        if let Some(finished) = monitor.take() {
            finished.join();
        }

        let signal = MonitorSignal::new();
        let engine = Arc::downgrade(self);
        let worker_signal = Arc::clone(&signal);
        let monitor_config = self.config.monitor.clone();

        let spawned = thread::Builder::new()
            .name("insightcache-monitor".to_string())
            .spawn(move || Self::run_monitor(engine, worker_signal, monitor_config));

        match spawned {
            Ok(thread) => {
                *monitor = Some(MonitorHandle::new(signal, thread));
                log::info!("Continuous monitoring started");
                true
            }
            Err(e) => {
                log::error!("Failed to spawn monitoring worker: {}", e);
                false
            }
        }
    }

    /// Stop the monitoring worker, waiting at most the configured join
    /// timeout; a no-op when monitoring is not running.
    ///
    /// A worker still busy after the timeout stays registered until it
    /// exits, so no second worker can start alongside it.
    pub fn stop_continuous_monitoring(&self) {
        let signal = match self.monitor.lock().as_ref() {
            Some(handle) => handle.signal(),
            None => return,
        };

        signal.request_stop();

        let timeout = self.config.monitor.join_timeout;
        if !signal.wait_for_finish(timeout) {
            log::warn!(
                "Monitoring worker did not exit within {:?}; it will finish in the background",
                timeout
            );
            return;
        }

        let finished = {
            let mut monitor = self.monitor.lock();
            let same_worker = monitor
                .as_ref()
                .map(|handle| Arc::ptr_eq(&handle.signal(), &signal))
                .unwrap_or(false);
            if same_worker {
                monitor.take()
            } else {
                None
            }
        };

        if let Some(handle) = finished {
            handle.join();
            log::info!("Continuous monitoring stopped");
        }
    }

    /// Whether a worker is running and has not been asked to stop
    pub fn is_monitoring(&self) -> bool {
        self.monitor
            .lock()
            .as_ref()
            .map(|m| m.is_running() && !m.is_stop_requested())
            .unwrap_or(false)
    }

    fn run_monitor(engine: Weak<Self>, signal: Arc<MonitorSignal>, config: MonitorConfig) {
        let _finished = signal.finish_guard();

        while !signal.is_stop_requested() {
            let Some(strong) = engine.upgrade() else {
                break;
            };

            let outcome = catch_unwind(AssertUnwindSafe(|| strong.monitor_iteration()));
            drop(strong);

            let pause = match outcome {
                Ok(Ok(())) => config.interval,
                Ok(Err(e)) => {
                    log::error!("Monitoring iteration failed: {}", e);
                    config.error_backoff
                }
                Err(_) => {
                    log::error!("Monitoring iteration panicked");
                    config.error_backoff
                }
            };

            if signal.wait_for_stop(pause) {
                break;
            }
        }

        log::debug!("Monitoring worker exiting");
    }

    /// One pass of the monitoring loop
    fn monitor_iteration(&self) -> CacheResult<()> {
        let monitor = &self.config.monitor;
        let snapshot = self.system_metrics.snapshot()?;

        if snapshot.memory_percent > monitor.memory_pressure_percent {
            log::warn!(
                "Memory pressure at {:.1}%; running cleanup",
                snapshot.memory_percent
            );
            self.memory_cleanup();
        }

        let metrics = self.cache.get_metrics();
        if metrics.total_requests > monitor.min_requests
            && metrics.hit_rate < self.config.low_hit_rate
        {
            log::info!(
                "Cache hit rate {:.1}% over {} requests; retuning",
                metrics.hit_rate * 100.0,
                metrics.total_requests
            );
            self.optimize_caching_config();
        }

        Ok(())
    }

    fn record(&self, result: OptimizationResult) {
        let mut history = self.history.lock();
        history.push(result);
        let limit = self.config.history_limit;
        if history.len() > limit {
            let excess = history.len() - limit;
            history.drain(..excess);
        }
    }

    pub fn optimization_history(&self) -> Vec<OptimizationResult> {
        self.history.lock().clone()
    }

    pub fn get_optimization_summary(&self) -> OptimizationSummary {
        let history = self.history.lock().clone();
        OptimizationSummary::from_history(
            &history,
            self.cache.get_metrics(),
            self.is_monitoring(),
        )
    }
}

impl<V> Drop for OptimizationEngine<V> {
    fn drop(&mut self) {
        // The worker may hold the last strong reference, so never join here
        if let Some(handle) = self.monitor.get_mut().take() {
            handle.request_stop();
        }
    }
}
