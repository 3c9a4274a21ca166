use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

use crate::utils::numeric_values;

/// K-nearest-neighbors imputer over a feature matrix with missing entries.
///
/// Distances are NaN-aware Euclidean: only coordinates present in both rows
/// count, scaled up by `n_features / n_shared`. Donors are the rows that have
/// a value in the target column. A receiver that shares no present coordinate
/// with any donor takes the mean of all donors; a column with no donors is left
/// untouched.
pub struct KNNImputer {
    n_neighbors: usize,
}

impl KNNImputer {
    /// Create a new KNN imputer with specified number of neighbors
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1), // Ensure at least 1 neighbor
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Impute one numeric column using only that column's own values.
    ///
    /// The feature matrix is the column itself, so neighbors never come from
    /// other columns. A missing row then shares no coordinate with any donor,
    /// and every gap takes the mean of the column's present values whatever
    /// `n_neighbors` is; the nearest-neighbor ranking only applies to
    /// multi-feature matrices passed to [`impute_column`](Self::impute_column).
    /// Returns a Float64 series; nulls survive only when the column has no
    /// present value at all.
    pub fn impute_series(&self, series: &Series) -> Result<Series> {
        let matrix: Vec<Vec<Option<f64>>> = numeric_values(series)?
            .into_iter()
            .map(|v| vec![v])
            .collect();

        let imputed = self.impute_column(&matrix, 0);
        Ok(Series::new(series.name().clone(), imputed))
    }

    /// Impute the missing entries of `target_col` in `matrix`.
    pub fn impute_column(&self, matrix: &[Vec<Option<f64>>], target_col: usize) -> Vec<Option<f64>> {
        let donors: Vec<usize> = (0..matrix.len())
            .filter(|&row| matrix[row][target_col].is_some())
            .collect();

        if donors.is_empty() {
            debug!("No donors for column {}, leaving nulls", target_col);
            return matrix.iter().map(|row| row[target_col]).collect();
        }

        matrix
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row[target_col].or_else(|| self.impute_value(matrix, row_idx, target_col, &donors))
            })
            .collect()
    }

    /// Impute a single missing value from its nearest donors.
    fn impute_value(
        &self,
        matrix: &[Vec<Option<f64>>],
        target_row: usize,
        target_col: usize,
        donors: &[usize],
    ) -> Option<f64> {
        let mut distances: Vec<(usize, f64)> = donors
            .iter()
            .filter_map(|&donor| {
                nan_euclidean(&matrix[target_row], &matrix[donor]).map(|d| (donor, d))
            })
            .collect();

        if distances.is_empty() {
            return mean(donors.iter().filter_map(|&row| matrix[row][target_col]));
        }

        // Stable sort keeps row order among equidistant donors
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.n_neighbors.min(distances.len());
        mean(
            distances
                .iter()
                .take(k)
                .filter_map(|&(row, _)| matrix[row][target_col]),
        )
    }
}

/// NaN-aware Euclidean distance between two rows.
///
/// Returns `None` when the rows share no present coordinate.
fn nan_euclidean(row1: &[Option<f64>], row2: &[Option<f64>]) -> Option<f64> {
    let n_features = row1.len();
    let mut sum_squared_diff = 0.0;
    let mut shared = 0;

    for (a, b) in row1.iter().zip(row2) {
        if let (Some(a), Some(b)) = (a, b) {
            let diff = a - b;
            sum_squared_diff += diff * diff;
            shared += 1;
        }
    }

    if shared == 0 {
        None
    } else {
        Some((sum_squared_diff * n_features as f64 / shared as f64).sqrt())
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}
