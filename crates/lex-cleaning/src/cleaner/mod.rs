//! Row- and column-level cleaning operations.
//!
//! This module provides:
//! - Exact duplicate row removal
//! - Type coercion of date-named and numeric columns

mod converters;
mod type_corrector;

pub use type_corrector::{CoercionOutcome, TypeCoercer};

use crate::utils::{column_names, is_float_dtype, nan_to_null};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Duplicate eliminator for the third pipeline stage.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that exactly repeat an earlier row across all columns.
    ///
    /// The first occurrence is kept and kept rows stay in their original order.
    /// Absent values compare equal to each other: float NaN is cleared to null
    /// before rows are compared.
    pub fn remove_duplicates(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut cleaning_actions = Vec::new();
        let mut df = df;

        info!("Removing duplicate rows...");

        for col_name in column_names(&df) {
            let series = df.column(&col_name)?.as_materialized_series();
            if is_float_dtype(series.dtype()) {
                let cleared = nan_to_null(series)?;
                df.replace(&col_name, cleared)?;
            }
        }

        let before = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = before - df.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            cleaning_actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                removed, pct
            ));
            debug!("Removed {} duplicate rows", removed);
        } else {
            cleaning_actions.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        Ok((df, cleaning_actions))
    }
}
