//! Type coercion for date-named and numeric columns.

use super::converters::to_datetime;
use crate::types::ColumnKind;
use crate::utils::{absent_count, column_names, nan_to_null, series_kind};
use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Fourth pipeline stage: re-derives column types after text cleanup.
pub struct TypeCoercer {
    date_prefix: String,
}

/// Outcome of a coercion pass.
#[derive(Debug, Default)]
pub struct CoercionOutcome {
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
}

impl TypeCoercer {
    pub fn new(date_prefix: impl Into<String>) -> Self {
        Self {
            date_prefix: date_prefix.into().to_lowercase(),
        }
    }

    fn is_date_column(&self, name: &str) -> bool {
        name.to_lowercase().starts_with(&self.date_prefix)
    }

    /// Coerce every column in place. Never removes rows.
    pub fn coerce(&self, mut df: DataFrame) -> Result<(DataFrame, CoercionOutcome)> {
        let mut outcome = CoercionOutcome::default();

        info!("Coercing column types...");

        for col_name in column_names(&df) {
            let series = df.column(&col_name)?.as_materialized_series().clone();

            if self.is_date_column(&col_name) {
                let before = absent_count(&series)?;
                let converted = to_datetime(&series)
                    .with_context(|| format!("Failed to parse '{}' as datetime", col_name))?;
                let lost = converted.null_count().saturating_sub(before);
                df.replace(&col_name, converted)?;

                outcome
                    .actions
                    .push(format!("Parsed '{}' as datetime", col_name));
                if lost > 0 {
                    let notice = format!(
                        "Column '{}': {} unparseable date values set to null",
                        col_name, lost
                    );
                    warn!("{}", notice);
                    outcome.warnings.push(notice);
                }
                continue;
            }

            if series_kind(&series) == ColumnKind::Numeric {
                let nan_count = absent_count(&series)?.saturating_sub(series.null_count());
                if nan_count > 0 {
                    df.replace(&col_name, nan_to_null(&series)?)?;
                    outcome.actions.push(format!(
                        "Converted {} NaN values in '{}' to null",
                        nan_count, col_name
                    ));
                    debug!("Converted {} NaN values in '{}'", nan_count, col_name);
                }
            }
        }

        Ok((df, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::converters::datetime_dtype;

    #[test]
    fn test_date_prefix_is_case_insensitive() {
        let coercer = TypeCoercer::new("date");
        assert!(coercer.is_date_column("date_signup"));
        assert!(coercer.is_date_column("DateOfBirth"));
        assert!(coercer.is_date_column("date"));
        assert!(!coercer.is_date_column("signup_date"));
        assert!(!coercer.is_date_column("update"));
    }

    #[test]
    fn test_date_column_parsed_and_failures_nulled() {
        let df = df![
            "date_signup" => ["2024-01-05", "not-a-date"],
            "comment" => ["a", "b"],
        ]
        .unwrap();

        let (df, outcome) = TypeCoercer::new("date").coerce(df).unwrap();
        let date = df.column("date_signup").unwrap();

        assert_eq!(date.dtype(), &datetime_dtype());
        assert_eq!(date.null_count(), 1);
        assert_eq!(df.column("comment").unwrap().dtype(), &DataType::String);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_numeric_nan_becomes_null() {
        let df = df!["score" => [1.0, f64::NAN, 3.0]].unwrap();

        let (df, outcome) = TypeCoercer::new("date").coerce(df).unwrap();
        let score = df.column("score").unwrap();
        assert_eq!(score.null_count(), 1);
        assert_eq!(score.dtype(), &DataType::Float64);
        assert_eq!(outcome.actions.len(), 1);
    }

    #[test]
    fn test_other_columns_unchanged() {
        let df = df![
            "id" => [1i64, 2],
            "name" => ["x", "y"],
            "flag" => [true, false],
        ]
        .unwrap();

        let (out, outcome) = TypeCoercer::new("date").coerce(df.clone()).unwrap();
        assert!(out.equals(&df));
        assert!(outcome.actions.is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let df = df!["ts_created" => ["2024-01-05"]].unwrap();

        let (df, _) = TypeCoercer::new("TS_").coerce(df).unwrap();
        assert_eq!(df.column("ts_created").unwrap().dtype(), &datetime_dtype());
    }

    #[test]
    fn test_row_count_preserved() {
        let df = df![
            "date" => [Some("2024-01-05"), None, Some("bad")],
            "x" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (df, _) = TypeCoercer::new("date").coerce(df).unwrap();
        assert_eq!(df.height(), 3);
        assert!(df.get_columns().iter().all(|c| c.len() == 3));
    }
}
