//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple stages
//! to reduce code duplication and ensure consistency.

use crate::types::ColumnKind;
use polars::prelude::*;

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

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_datetime_dtype(dtype) {
        ColumnKind::DateTime
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        ColumnKind::Text
    } else {
        ColumnKind::Other
    }
}

/// Get the kind of a Series.
pub fn series_kind(series: &Series) -> ColumnKind {
    column_kind(series.dtype())
}

// =============================================================================
// DataFrame Utilities
// =============================================================================

/// Column names as owned strings, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Keep the rows whose mask entry is `true`.
pub fn keep_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    df.filter(&mask)
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Number of absent cells: nulls, plus NaN for float columns.
pub fn absent_count(series: &Series) -> PolarsResult<usize> {
    if !is_float_dtype(series.dtype()) {
        return Ok(series.null_count());
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .filter(|v| v.is_none_or(|x| x.is_nan()))
        .count())
}

/// Numeric values as `Option<f64>`, with NaN mapped to `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Present (non-null, non-NaN) numeric values in row order.
pub fn present_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Replace NaN with null in float columns; other columns are returned as-is.
pub fn nan_to_null(series: &Series) -> PolarsResult<Series> {
    if !is_float_dtype(series.dtype()) {
        return Ok(series.clone());
    }
    let values = numeric_values(series)?;
    Series::new(series.name().clone(), values).cast(series.dtype())
}

/// Fill null values with a string, casting the column to text first.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let text = series.cast(&DataType::String)?;
    let filled: Vec<String> = text
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
