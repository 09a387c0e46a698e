//! Test utilities for InsightCache integration tests
//!
//! Provides logging setup, sample datasets and preconfigured stacks.

#![allow(dead_code)]

use insightcache::{
    CacheStack, ColumnData, DataFrame, InMemoryBaseCache, StackConfig, StaticMetrics,
};
use std::sync::Arc;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A lap-timing dataset of `rows` rows with deliberately wide column types
pub fn sample_laps(rows: usize) -> DataFrame {
    let compounds = ["soft", "medium", "hard"];
    let mut rng = fastrand::Rng::with_seed(7);

    DataFrame::new()
        .with_column("lap", ColumnData::Int64((1..=rows as i64).collect()))
        .unwrap()
        .with_column(
            "position",
            ColumnData::Int64((0..rows).map(|_| rng.i64(1..=20)).collect()),
        )
        .unwrap()
        .with_column(
            "compound",
            ColumnData::Text(
                (0..rows)
                    .map(|i| Some(compounds[i % compounds.len()].to_string()))
                    .collect(),
            ),
        )
        .unwrap()
        .with_column(
            "lap_time",
            ColumnData::Float64((0..rows).map(|_| 80.0 + rng.f64() * 10.0).collect()),
        )
        .unwrap()
}

/// A stack over an in-memory base cache with controllable system metrics
pub fn test_stack(config: StackConfig) -> (CacheStack, Arc<StaticMetrics>) {
    let metrics = Arc::new(StaticMetrics::with_memory_percent(40.0));
    let base = InMemoryBaseCache::new(
        config.base_cache.partition.clone(),
        config.base_cache.max_memory_bytes,
    )
    .expect("Failed to create base cache");

    let stack = CacheStack::with_components(config, Arc::new(base), metrics.clone())
        .expect("Failed to create cache stack");
    (stack, metrics)
}
