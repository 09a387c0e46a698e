// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Optimization engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{CacheError, CacheResult};

/// Background monitoring loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pause between healthy iterations
    pub interval: Duration,

    /// Pause after a failed iteration
    pub error_backoff: Duration,

    /// Upper bound on how long stop waits for the worker to exit
    pub join_timeout: Duration,

    /// System memory usage (%) that triggers a memory cleanup
    pub memory_pressure_percent: f64,

    /// Requests required before hit rate is considered meaningful
    pub min_requests: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            error_backoff: Duration::from_secs(60),
            join_timeout: Duration::from_secs(5),
            memory_pressure_percent: 85.0,
            min_requests: 100,
        }
    }
}

/// Optimization engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Settings for the owned memoization cache
    pub cache: CacheConfig,

    /// Calls faster than this are not worth caching
    pub significance_threshold: Duration,

    /// Hard ceiling when growing the cache
    pub max_cache_size: usize,

    /// Hit rate below which the cache is grown
    pub low_hit_rate: f64,

    /// Hit rate below which a recommendation is emitted
    pub advisory_hit_rate: f64,

    /// Cache memory (MB) above which a recommendation is emitted
    pub memory_warning_mb: f64,

    /// Text columns with distinct/total below this become categorical
    pub categorical_ratio: f64,

    /// Maximum optimization results retained in history
    pub history_limit: usize,

    pub monitor: MonitorConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            significance_threshold: Duration::from_millis(100),
            max_cache_size: 5000,
            low_hit_rate: 0.5,
            advisory_hit_rate: 0.7,
            memory_warning_mb: 1000.0,
            categorical_ratio: 0.5,
            history_limit: 1000,
            monitor: MonitorConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.cache.validate()?;

        if self.max_cache_size < self.cache.max_size {
            return Err(format!(
                "max_cache_size ({}) is below the initial cache size ({})",
                self.max_cache_size, self.cache.max_size
            ));
        }

        for (name, rate) in [
            ("low_hit_rate", self.low_hit_rate),
            ("advisory_hit_rate", self.advisory_hit_rate),
            ("categorical_ratio", self.categorical_ratio),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{} must be within [0, 1], got {}", name, rate));
            }
        }

        if self.history_limit == 0 {
            return Err("history_limit must be > 0".to_string());
        }

        if self.monitor.interval.is_zero() {
            return Err("monitor interval must be > 0".to_string());
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

    /// Write the configuration as pretty-printed JSON
    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> CacheResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
