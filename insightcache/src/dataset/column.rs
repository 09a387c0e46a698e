// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed column storage with introspection helpers

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Categorical,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
}

impl ColumnType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Int8
                | ColumnType::Int16
                | ColumnType::Int32
                | ColumnType::Int64
                | ColumnType::UInt8
                | ColumnType::UInt16
                | ColumnType::UInt32
                | ColumnType::UInt64
        )
    }

    /// Narrowest integer type that holds every value in `min..=max`
    pub fn narrowest_integer(min: i128, max: i128) -> ColumnType {
        if min >= 0 {
            if max <= u8::MAX as i128 {
                ColumnType::UInt8
            } else if max <= u16::MAX as i128 {
                ColumnType::UInt16
            } else if max <= u32::MAX as i128 {
                ColumnType::UInt32
            } else {
                ColumnType::UInt64
            }
        } else if min >= i8::MIN as i128 && max <= i8::MAX as i128 {
            ColumnType::Int8
        } else if min >= i16::MIN as i128 && max <= i16::MAX as i128 {
            ColumnType::Int16
        } else if min >= i32::MIN as i128 && max <= i32::MAX as i128 {
            ColumnType::Int32
        } else {
            ColumnType::Int64
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Categorical => "category",
            ColumnType::Int8 => "int8",
            ColumnType::Int16 => "int16",
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::UInt8 => "uint8",
            ColumnType::UInt16 => "uint16",
            ColumnType::UInt32 => "uint32",
            ColumnType::UInt64 => "uint64",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Dictionary-encoded text column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalData {
    pub categories: Vec<String>,
    pub codes: Vec<Option<u32>>,
}

impl CategoricalData {
    /// Intern text values; categories are kept in sorted order
    pub fn encode(values: &[Option<String>]) -> Self {
        let categories: Vec<String> = values
            .iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let index: HashMap<&str, u32> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as u32))
            .collect();

        let codes = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| index.get(s).copied()))
            .collect();

        Self { categories, codes }
    }

    pub fn value(&self, row: usize) -> Option<&str> {
        let code = (*self.codes.get(row)?)?;
        self.categories.get(code as usize).map(String::as_str)
    }

    pub fn decode(&self) -> Vec<Option<String>> {
        (0..self.codes.len())
            .map(|row| self.value(row).map(str::to_string))
            .collect()
    }
}

/// Column values, one variant per physical representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Categorical(CategoricalData),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
}

fn vec_bytes<T>(v: &[T]) -> usize {
    std::mem::size_of_val(v)
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::Categorical(_) => ColumnType::Categorical,
            ColumnData::Int8(_) => ColumnType::Int8,
            ColumnData::Int16(_) => ColumnType::Int16,
            ColumnData::Int32(_) => ColumnType::Int32,
            ColumnData::Int64(_) => ColumnType::Int64,
            ColumnData::UInt8(_) => ColumnType::UInt8,
            ColumnData::UInt16(_) => ColumnType::UInt16,
            ColumnData::UInt32(_) => ColumnType::UInt32,
            ColumnData::UInt64(_) => ColumnType::UInt64,
            ColumnData::Float32(_) => ColumnType::Float32,
            ColumnData::Float64(_) => ColumnType::Float64,
            ColumnData::Bool(_) => ColumnType::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Categorical(c) => c.codes.len(),
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deep memory footprint of the values, in bytes
    pub fn memory_usage_bytes(&self) -> usize {
        match self {
            ColumnData::Text(v) => {
                vec_bytes(v)
                    + v.iter()
                        .flatten()
                        .map(|s| s.capacity())
                        .sum::<usize>()
            }
            ColumnData::Categorical(c) => {
                vec_bytes(&c.codes)
                    + vec_bytes(&c.categories)
                    + c.categories.iter().map(|s| s.capacity()).sum::<usize>()
            }
            ColumnData::Int8(v) => vec_bytes(v),
            ColumnData::Int16(v) => vec_bytes(v),
            ColumnData::Int32(v) => vec_bytes(v),
            ColumnData::Int64(v) => vec_bytes(v),
            ColumnData::UInt8(v) => vec_bytes(v),
            ColumnData::UInt16(v) => vec_bytes(v),
            ColumnData::UInt32(v) => vec_bytes(v),
            ColumnData::UInt64(v) => vec_bytes(v),
            ColumnData::Float32(v) => vec_bytes(v),
            ColumnData::Float64(v) => vec_bytes(v),
            ColumnData::Bool(v) => vec_bytes(v),
        }
    }

    /// Number of distinct non-null values
    pub fn distinct_count(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Categorical(c) => c.codes.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Float32(v) => v
                .iter()
                .filter(|x| !x.is_nan())
                .map(|x| x.to_bits())
                .collect::<HashSet<_>>()
                .len(),
            ColumnData::Float64(v) => v
                .iter()
                .filter(|x| !x.is_nan())
                .map(|x| x.to_bits())
                .collect::<HashSet<_>>()
                .len(),
            ColumnData::Bool(v) => v.iter().collect::<HashSet<_>>().len(),
            other => other
                .int_values()
                .map(|values| values.into_iter().collect::<HashSet<_>>().len())
                .unwrap_or(0),
        }
    }

    /// Observed (min, max) of an integer column; `None` for other types or no rows
    pub fn int_range(&self) -> Option<(i128, i128)> {
        let values = self.int_values()?;
        let min = values.iter().min()?;
        let max = values.iter().max()?;
        Some((*min, *max))
    }

    /// Integer values widened to i128; `None` for non-integer columns
    pub fn int_values(&self) -> Option<Vec<i128>> {
        fn widen<T: Copy + Into<i128>>(v: &[T]) -> Vec<i128> {
            v.iter().map(|x| (*x).into()).collect()
        }

        match self {
            ColumnData::Int8(v) => Some(widen(v)),
            ColumnData::Int16(v) => Some(widen(v)),
            ColumnData::Int32(v) => Some(widen(v)),
            ColumnData::Int64(v) => Some(widen(v)),
            ColumnData::UInt8(v) => Some(widen(v)),
            ColumnData::UInt16(v) => Some(widen(v)),
            ColumnData::UInt32(v) => Some(widen(v)),
            ColumnData::UInt64(v) => Some(widen(v)),
            _ => None,
        }
    }

    /// Build an integer column of the given type; values must already fit
    pub fn from_int_values(values: &[i128], column_type: ColumnType) -> Option<ColumnData> {
        let data = match column_type {
            ColumnType::Int8 => ColumnData::Int8(values.iter().map(|v| *v as i8).collect()),
            ColumnType::Int16 => ColumnData::Int16(values.iter().map(|v| *v as i16).collect()),
            ColumnType::Int32 => ColumnData::Int32(values.iter().map(|v| *v as i32).collect()),
            ColumnType::Int64 => ColumnData::Int64(values.iter().map(|v| *v as i64).collect()),
            ColumnType::UInt8 => ColumnData::UInt8(values.iter().map(|v| *v as u8).collect()),
            ColumnType::UInt16 => ColumnData::UInt16(values.iter().map(|v| *v as u16).collect()),
            ColumnType::UInt32 => ColumnData::UInt32(values.iter().map(|v| *v as u32).collect()),
            ColumnType::UInt64 => ColumnData::UInt64(values.iter().map(|v| *v as u64).collect()),
            _ => return None,
        };
        Some(data)
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn memory_usage_bytes(&self) -> usize {
        self.name.capacity() + self.data.memory_usage_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrowest_integer() {
        assert_eq!(ColumnType::narrowest_integer(0, 255), ColumnType::UInt8);
        assert_eq!(ColumnType::narrowest_integer(0, 256), ColumnType::UInt16);
        assert_eq!(ColumnType::narrowest_integer(-1, 127), ColumnType::Int8);
        assert_eq!(ColumnType::narrowest_integer(-129, 0), ColumnType::Int16);
        assert_eq!(ColumnType::narrowest_integer(0, 70_000), ColumnType::UInt32);
        assert_eq!(ColumnType::narrowest_integer(-70_000, 0), ColumnType::Int32);
        assert_eq!(ColumnType::narrowest_integer(0, u32::MAX as i128 + 1), ColumnType::UInt64);
        assert_eq!(ColumnType::narrowest_integer(i64::MIN as i128, 0), ColumnType::Int64);
    }

    #[test]
    fn test_int_range_and_distinct() {
        let data = ColumnData::Int64(vec![5, -3, 5, 12]);
        assert_eq!(data.int_range(), Some((-3, 12)));
        assert_eq!(data.distinct_count(), 3);
        assert_eq!(ColumnData::Int64(vec![]).int_range(), None);
        assert_eq!(ColumnData::Float64(vec![1.0]).int_range(), None);
    }

    #[test]
    fn test_categorical_encode_round_trip() {
        let values = vec![
            Some("soft".to_string()),
            Some("hard".to_string()),
            None,
            Some("soft".to_string()),
        ];
        let encoded = CategoricalData::encode(&values);
        assert_eq!(encoded.categories, vec!["hard", "soft"]);
        assert_eq!(encoded.value(0), Some("soft"));
        assert_eq!(encoded.value(2), None);
        assert_eq!(encoded.decode(), values);
    }

    #[test]
    fn test_memory_usage_reflects_width() {
        let wide = ColumnData::Int64(vec![1; 100]);
        let narrow = ColumnData::UInt8(vec![1; 100]);
        assert_eq!(wide.memory_usage_bytes(), 800);
        assert_eq!(narrow.memory_usage_bytes(), 100);
    }
}
