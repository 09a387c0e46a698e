// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Column-level memory reduction for tabular datasets

use rayon::prelude::*;
use std::collections::HashSet;

use crate::dataset::{CategoricalData, Column, ColumnData, ColumnType, DataFrame};
use crate::error::CacheResult;

/// Rewrite every column into its most compact lossless-range representation.
///
/// Returns the optimized frame and one description per applied transform.
/// Columns are analyzed in parallel; column order is preserved.
pub fn shrink_dataframe(
    frame: &DataFrame,
    categorical_ratio: f64,
) -> CacheResult<(DataFrame, Vec<String>)> {
    let outcomes: Vec<(Column, Option<String>)> = frame
        .columns()
        .par_iter()
        .map(|column| shrink_column(column, categorical_ratio))
        .collect();

    let mut applied = Vec::new();
    let mut columns = Vec::with_capacity(outcomes.len());
    for (column, transform) in outcomes {
        if let Some(transform) = transform {
            applied.push(transform);
        }
        columns.push(column);
    }

    Ok((DataFrame::from_columns(columns)?, applied))
}

fn shrink_column(column: &Column, categorical_ratio: f64) -> (Column, Option<String>) {
    let name = &column.name;
    let from = column.column_type();

    let rewritten = match &column.data {
        ColumnData::Text(values) => categorize(values, categorical_ratio),
        ColumnData::Float64(values) => narrow_floats(values),
        data if from.is_integer() => narrow_integers(data),
        _ => None,
    };

    match rewritten {
        Some(data) => {
            let transform = format!("{}: {} -> {}", name, from, data.column_type());
            (Column::new(name.clone(), data), Some(transform))
        }
        None => (column.clone(), None),
    }
}

fn categorize(values: &[Option<String>], categorical_ratio: f64) -> Option<ColumnData> {
    if values.is_empty() {
        return None;
    }

    let distinct = values.iter().flatten().collect::<HashSet<_>>().len();
    if (distinct as f64 / values.len() as f64) < categorical_ratio {
        Some(ColumnData::Categorical(CategoricalData::encode(values)))
    } else {
        None
    }
}

fn narrow_integers(data: &ColumnData) -> Option<ColumnData> {
    let (min, max) = data.int_range()?;
    let target = ColumnType::narrowest_integer(min, max);
    if target == data.column_type() {
        return None;
    }

    let values = data.int_values()?;
    ColumnData::from_int_values(&values, target)
}

fn narrow_floats(values: &[f64]) -> Option<ColumnData> {
    if values.is_empty() {
        return None;
    }

    // Magnitudes must stay within f32 range without flushing nonzero values
    // to zero
    let fits = values.iter().all(|v| {
        !v.is_finite() || (v.abs() <= f32::MAX as f64 && (*v == 0.0 || *v as f32 != 0.0))
    });

    if fits {
        Some(ColumnData::Float32(values.iter().map(|v| *v as f32).collect()))
    } else {
        None
    }
}
