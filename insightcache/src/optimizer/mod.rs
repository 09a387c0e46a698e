// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Performance optimization engine
//!
//! This module provides:
//! - Cache sizing based on observed hit rates
//! - Memory reduction for tabular datasets
//! - Process memory cleanup
//! - A supervised background monitoring loop

pub mod engine;
pub mod monitor;
pub mod optimizer_config;
pub mod tabular;

pub use engine::OptimizationEngine;
pub use optimizer_config::{MonitorConfig, OptimizerConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::CacheMetrics;
use crate::error::CacheError;

pub(crate) use crate::cache::intelligent_cache::BYTES_PER_MB;

/// Kind of optimization performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationType {
    TabularData,
    CachingConfig,
    MemoryCleanup,
}

impl std::fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OptimizationType::TabularData => "tabular_data",
            OptimizationType::CachingConfig => "caching_config",
            OptimizationType::MemoryCleanup => "memory_cleanup",
        };
        f.write_str(name)
    }
}

/// Outcome of a single optimization; appended to the engine history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimization_type: OptimizationType,
    pub success: bool,
    /// Advisory percentage; not a verified measurement
    pub performance_gain: f64,
    pub memory_saved_mb: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub recommendations: Vec<String>,
    pub applied_optimizations: Vec<String>,
    pub message: Option<String>,
}

impl OptimizationResult {
    pub(crate) fn new(optimization_type: OptimizationType, started_at: DateTime<Utc>) -> Self {
        Self {
            optimization_type,
            success: false,
            performance_gain: 0.0,
            memory_saved_mb: 0.0,
            started_at,
            completed_at: started_at,
            recommendations: Vec::new(),
            applied_optimizations: Vec::new(),
            message: None,
        }
    }

    /// Unsuccessful result carrying the cause as an optimization failure
    pub(crate) fn failed(
        optimization_type: OptimizationType,
        started_at: DateTime<Utc>,
        cause: impl std::fmt::Display,
    ) -> Self {
        let error = CacheError::OptimizationFailed(format!("{}: {}", optimization_type, cause));
        Self {
            completed_at: Utc::now(),
            message: Some(error.to_string()),
            ..Self::new(optimization_type, started_at)
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

/// Aggregate view over the optimization history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_optimizations: usize,
    pub optimizations_by_type: BTreeMap<OptimizationType, usize>,
    pub successful_optimizations: usize,
    pub success_rate: f64,
    pub total_memory_saved_mb: f64,
    pub cache_metrics: CacheMetrics,
    pub monitoring_active: bool,
}

impl OptimizationSummary {
    pub(crate) fn from_history(
        history: &[OptimizationResult],
        cache_metrics: CacheMetrics,
        monitoring_active: bool,
    ) -> Self {
        let mut optimizations_by_type = BTreeMap::new();
        for result in history {
            *optimizations_by_type
                .entry(result.optimization_type)
                .or_insert(0) += 1;
        }

        let successful_optimizations = history.iter().filter(|r| r.success).count();
        let success_rate = if history.is_empty() {
            0.0
        } else {
            successful_optimizations as f64 / history.len() as f64
        };

        Self {
            total_optimizations: history.len(),
            optimizations_by_type,
            successful_optimizations,
            success_rate,
            total_memory_saved_mb: history.iter().map(|r| r.memory_saved_mb).sum(),
            cache_metrics,
            monitoring_active,
        }
    }
}
