// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory tabular datasets
//!
//! A [`DataFrame`] is an ordered set of equally sized, named, typed columns.
//! Columns can be introspected (type, range, cardinality, footprint) and
//! rewritten in place, which is what dataset optimization relies on.

pub mod column;

pub use column::{CategoricalData, Column, ColumnData, ColumnType};

use serde::{Deserialize, Serialize};

use crate::cache::EstimateSize;
use crate::error::{CacheError, CacheResult};

/// In-memory table of typed columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from columns, validating names and lengths
    pub fn from_columns(columns: Vec<Column>) -> CacheResult<Self> {
        let mut frame = Self::new();
        for column in columns {
            frame.add_column(column.name, column.data)?;
        }
        Ok(frame)
    }

    /// Builder-style [`add_column`](Self::add_column)
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> CacheResult<Self> {
        self.add_column(name, data)?;
        Ok(self)
    }

    pub fn add_column(&mut self, name: impl Into<String>, data: ColumnData) -> CacheResult<()> {
        let name = name.into();

        if self.column(&name).is_some() {
            return Err(CacheError::InvalidDataset(format!(
                "Duplicate column: {}",
                name
            )));
        }

        if let Some(first) = self.columns.first() {
            if first.data.len() != data.len() {
                return Err(CacheError::InvalidDataset(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    data.len(),
                    first.data.len()
                )));
            }
        }

        self.columns.push(Column::new(name, data));
        Ok(())
    }

    /// Replace the values of an existing column; row count must not change
    pub fn replace_data(&mut self, name: &str, data: ColumnData) -> CacheResult<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CacheError::InvalidDataset(format!("Unknown column: {}", name)))?;

        if column.data.len() != data.len() {
            return Err(CacheError::InvalidDataset(format!(
                "Replacement for '{}' has {} rows, expected {}",
                name,
                data.len(),
                column.data.len()
            )));
        }

        column.data = data;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Deep memory footprint of all columns, in bytes
    pub fn memory_usage_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .columns
                .iter()
                .map(Column::memory_usage_bytes)
                .sum::<usize>()
    }
}

impl EstimateSize for DataFrame {
    fn estimate_size(&self) -> usize {
        self.memory_usage_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_introspect() {
        let frame = DataFrame::new()
            .with_column("lap", ColumnData::Int64(vec![1, 2, 3]))
            .unwrap()
            .with_column("speed", ColumnData::Float64(vec![201.5, 203.0, 199.9]))
            .unwrap();

        assert_eq!(frame.num_rows(), 3);
        assert_eq!(frame.num_columns(), 2);
        assert_eq!(frame.column("lap").unwrap().column_type(), ColumnType::Int64);
        assert!(frame.memory_usage_bytes() >= 48);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let result = DataFrame::new()
            .with_column("a", ColumnData::Int64(vec![1, 2]))
            .unwrap()
            .with_column("b", ColumnData::Int64(vec![1]));
        assert!(matches!(result, Err(CacheError::InvalidDataset(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = DataFrame::from_columns(vec![
            Column::new("a", ColumnData::Bool(vec![true])),
            Column::new("a", ColumnData::Bool(vec![false])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_data() {
        let mut frame = DataFrame::new()
            .with_column("a", ColumnData::Int64(vec![1, 2]))
            .unwrap();

        frame.replace_data("a", ColumnData::UInt8(vec![1, 2])).unwrap();
        assert_eq!(frame.column("a").unwrap().column_type(), ColumnType::UInt8);

        assert!(frame.replace_data("a", ColumnData::UInt8(vec![1])).is_err());
        assert!(frame.replace_data("missing", ColumnData::UInt8(vec![1, 2])).is_err());
    }
}
