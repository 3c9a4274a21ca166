//! Outlier handling module.
//!
//! Rows are removed with the IQR rule, one numeric column at a time. The
//! filter is sequential: quartiles for a column are computed on the rows that
//! survived the columns before it, so column order affects the result.

use crate::types::ColumnKind;
use crate::utils::{column_names, keep_rows, numeric_values, series_kind};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Linear-interpolation quantile of already sorted values.
///
/// Uses position `q * (n - 1)`, matching the common default in dataframe
/// libraries. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Inclusive `[Q1 - k*IQR, Q3 + k*IQR]` fences for the given values.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;

    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Fifth pipeline stage: sequential IQR row filter.
pub struct OutlierHandler {
    multiplier: f64,
}

impl OutlierHandler {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Filter on every numeric column in table order.
    pub fn remove_outliers(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let columns: Vec<String> = column_names(&df)
            .into_iter()
            .filter(|name| {
                df.column(name)
                    .is_ok_and(|c| series_kind(c.as_materialized_series()) == ColumnKind::Numeric)
            })
            .collect();

        self.remove_outliers_in_order(df, &columns)
    }

    /// Filter on the given columns, in the given order.
    pub fn remove_outliers_in_order(
        &self,
        mut df: DataFrame,
        columns: &[String],
    ) -> Result<(DataFrame, Vec<String>)> {
        let mut processing_steps = Vec::new();
        let original_rows = df.height();

        for col_name in columns {
            let values = numeric_values(df.column(col_name)?.as_materialized_series())?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();

            let Some((lower_bound, upper_bound)) = iqr_bounds(&present, self.multiplier) else {
                debug!("Skipping outlier filter for '{}': no values", col_name);
                continue;
            };

            // Absent values are never outside the fences
            let keep: Vec<bool> = values
                .iter()
                .map(|v| v.is_none_or(|x| x >= lower_bound && x <= upper_bound))
                .collect();

            let before = df.height();
            df = keep_rows(&df, &keep)?;
            let removed = before - df.height();

            if removed > 0 {
                processing_steps.push(format!(
                    "Removed {} outlier rows via '{}' (bounds {:.4} to {:.4})",
                    removed, col_name, lower_bound, upper_bound
                ));
                debug!("Removed {} outlier rows via '{}'", removed, col_name);
            }
        }

        let rows_removed = original_rows - df.height();
        if rows_removed > 0 {
            debug!("Removed {} outlier rows in total", rows_removed);
        } else {
            processing_steps.push("No outlier rows found".to_string());
        }

        Ok((df, processing_steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(df: &DataFrame) -> Vec<(i64, i64)> {
        let a = df.column("a").unwrap().i64().unwrap().clone();
        let b = df.column("b").unwrap().i64().unwrap().clone();
        a.into_iter()
            .zip(b.into_iter())
            .map(|(x, y)| (x.unwrap(), y.unwrap()))
            .collect()
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 2.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.75), Some(2.5));
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
    }

    #[test]
    fn test_iqr_bounds() {
        let (lower, upper) = iqr_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0], 1.5).unwrap();
        assert_eq!(lower, -1.0);
        assert_eq!(upper, 7.0);
    }

    #[test]
    fn test_removes_extreme_row() {
        let df = df![
            "x" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
            "label" => ["a", "b", "c", "d", "e", "f"],
        ]
        .unwrap();

        let (df, steps) = OutlierHandler::new(1.5).remove_outliers(df).unwrap();
        assert_eq!(df.height(), 5);
        assert!(steps[0].starts_with("Removed 1 outlier rows via 'x'"));
    }

    #[test]
    fn test_absent_values_are_kept() {
        let df = df!["x" => [Some(1.0), None, Some(2.0), Some(3.0), Some(1000.0)]].unwrap();

        let (df, _) = OutlierHandler::new(1.5).remove_outliers(df).unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.column("x").unwrap().null_count(), 1);
    }

    #[test]
    fn test_all_absent_column_is_skipped() {
        let df = df![
            "empty" => [Option::<f64>::None, None, None],
            "x" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (df, steps) = OutlierHandler::new(1.5).remove_outliers(df).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(steps, vec!["No outlier rows found".to_string()]);
    }

    #[test]
    fn test_non_numeric_columns_ignored() {
        let df = df!["s" => ["a", "b", "c", "zzzzzzzzzz"]].unwrap();

        let (df, _) = OutlierHandler::new(1.5).remove_outliers(df).unwrap();
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_filter_is_sequential_and_order_sensitive() {
        let df = df![
            "a" => [4i64, 1, 2, 2],
            "b" => [4i64, 5, 5, 9],
        ]
        .unwrap();
        let handler = OutlierHandler::new(1.5);

        // a first: fences [0.625, 3.625] drop (4, 4); then b = [5, 5, 9] keeps all
        let (ab, _) = handler
            .remove_outliers_in_order(df.clone(), &["a".to_string(), "b".to_string()])
            .unwrap();
        // b first: fences [2.875, 7.875] drop (2, 9); then a = [4, 1, 2] keeps all
        let (ba, _) = handler
            .remove_outliers_in_order(df.clone(), &["b".to_string(), "a".to_string()])
            .unwrap();

        assert_eq!(rows(&ab), vec![(1, 5), (2, 5), (2, 9)]);
        assert_eq!(rows(&ba), vec![(4, 4), (1, 5), (2, 5)]);

        // Table order is a then b
        let (default_order, _) = handler.remove_outliers(df).unwrap();
        assert_eq!(rows(&default_order), rows(&ab));
    }

    #[test]
    fn test_fences_are_inclusive() {
        let df = df!["x" => [1.0, 2.0, 3.0, 4.0, 5.0]].unwrap();

        let (df, _) = OutlierHandler::new(0.0).remove_outliers(df).unwrap();
        // fences [2, 4]; 2 and 4 stay
        let kept: Vec<Option<f64>> = df.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(kept, vec![Some(2.0), Some(3.0), Some(4.0)]);
    }
}
