// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the cache and optimization engine

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Base cache error: {0}")]
    BaseCache(String),

    #[error("System metrics unavailable: {0}")]
    SystemMetrics(String),

    #[error("Optimization failed: {0}")]
    OptimizationFailed(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerializationError(err.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
