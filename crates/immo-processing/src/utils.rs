//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{CleaningError, Result};
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Common placeholder markers found in the scraped export.
pub const ERROR_MARKERS: [&str; 9] = [
    "error", "unknown", "n/a", "na", "null", "missing", "none", "nan", "#n/a",
];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is an error/missing value marker.
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value.
///
/// Handles currency symbols, percentages and thousands separators.
/// NaN and infinities are treated as missing.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    if is_error_marker(s) {
        return None;
    }
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 5] = ["true", "yes", "1", "t", "y"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 5] = ["false", "no", "0", "f", "n"];

/// Parse a boolean-like string. Numbers other than 0/1 count as true when positive.
pub fn parse_boolean_like(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.contains(&lower.as_str()) {
        return Some(true);
    }
    if BOOLEAN_FALSE_VALUES.contains(&lower.as_str()) {
        return Some(false);
    }
    parse_numeric_string(&lower).map(|v| v > 0.0)
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Check whether a column exists.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Fail with [`CleaningError::ColumnNotFound`] for the first absent column.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    match names.iter().find(|name| !has_column(df, name)) {
        Some(missing) => Err(CleaningError::ColumnNotFound(missing.to_string())),
        None => Ok(()),
    }
}

/// Render a column as optional strings, whatever its dtype.
pub fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series();
    series_as_strings(series)
}

/// Render a Series as optional strings, whatever its dtype.
pub fn series_as_strings(series: &Series) -> Result<Vec<Option<String>>> {
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Read a column as optional finite floats.
///
/// Strings are parsed with [`parse_numeric_string`], booleans map to 1/0,
/// NaN and infinities become `None`.
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.as_materialized_series();
    series_as_f64(series)
}

/// Read a Series as optional finite floats.
pub fn series_as_f64(series: &Series) -> Result<Vec<Option<f64>>> {
    let values = match series.dtype() {
        dtype if is_numeric_dtype(dtype) => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect(),
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect(),
        _ => series_as_strings(series)?
            .into_iter()
            .map(|v| v.as_deref().and_then(parse_numeric_string))
            .collect(),
    };
    Ok(values)
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Most frequent value. Ties resolve to the lexicographically smallest value
/// so repeated runs agree.
pub fn deterministic_mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

/// Rounded mean of the known values, `None` when there are none.
pub fn rounded_mean(values: &[Option<f64>]) -> Option<i64> {
    let known: Vec<f64> = values.iter().flatten().copied().collect();
    if known.is_empty() {
        return None;
    }
    let mean = known.iter().sum::<f64>() / known.len() as f64;
    Some(mean.round() as i64)
}

// =============================================================================
// Tests
// =============================================================================
