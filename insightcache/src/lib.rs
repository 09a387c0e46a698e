// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! InsightCache - in-process caching and performance optimization
//!
//! InsightCache accelerates analytics workloads that repeatedly compute the
//! same results over tabular data.
//!
//! # Features
//!
//! - **Memoization Cache**: Bounded LRU cache with TTL expiry and hit/miss metrics
//! - **Optimization Engine**: Adaptive cache sizing, dataset shrinking and memory cleanup
//! - **Background Monitoring**: Supervised worker reacting to memory pressure and poor hit rates
//! - **Cache Analytics**: Per-key access tracking and adaptive TTLs over a session cache
//!
//! # Usage
//!
//! Build the components once at startup and pass them to the code that needs
//! them:
//!
//! ```ignore
//! let stack = CacheStack::new(StackConfig::default())?;
//! stack.engine().start_continuous_monitoring();
//!
//! let item = stack.manager().get_with_analytics(
//!     CacheCategory::Analysis, "session-1", "lap_stats", &Parameters::new());
//! ```

pub mod cache;
pub mod dataset;
pub mod error;
pub mod optimizer;
pub mod stack;
pub mod system;

pub use cache::{
    generate_key, BaseCache, CacheCategory, CacheConfig, CacheItem, CacheMetrics,
    EnhancedCacheManager, EnhancedCacheMetrics, EstimateSize, InMemoryBaseCache,
    IntelligentCache, ManagerConfig, NullBaseCache, Parameters,
};
pub use dataset::{Column, ColumnData, ColumnType, DataFrame};
pub use error::{CacheError, CacheResult};
pub use optimizer::{
    OptimizationEngine, OptimizationResult, OptimizationSummary, OptimizationType,
    OptimizerConfig,
};
pub use stack::{BaseCacheConfig, CacheStack, StackConfig};
pub use system::{StaticMetrics, SysinfoMetrics, SystemMetricsProvider, SystemSnapshot};

/// InsightCache version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// InsightCache crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
