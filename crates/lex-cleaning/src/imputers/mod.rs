//! Missing-value imputation.
//!
//! Numeric columns are filled by single-column KNN; every other column kind is
//! cast to text and filled with a constant placeholder.

mod knn;

pub use knn::KNNImputer;

use crate::types::ColumnKind;
use crate::utils::{absent_count, column_names, fill_string_nulls, series_kind};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// First pipeline stage: resolves absent cells column by column.
pub struct MissingValueImputer {
    knn: KNNImputer,
    placeholder: String,
}

/// Outcome of an imputation pass.
#[derive(Debug, Default)]
pub struct ImputationOutcome {
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
}

impl MissingValueImputer {
    pub fn new(n_neighbors: usize, placeholder: impl Into<String>) -> Self {
        Self {
            knn: KNNImputer::new(n_neighbors),
            placeholder: placeholder.into(),
        }
    }

    /// Impute every column that has at least one absent value.
    pub fn impute(&self, mut df: DataFrame) -> Result<(DataFrame, ImputationOutcome)> {
        let mut outcome = ImputationOutcome::default();

        info!("Imputing missing values...");

        for col_name in column_names(&df) {
            let series = df.column(&col_name)?.as_materialized_series().clone();
            let missing = absent_count(&series)?;
            if missing == 0 {
                continue;
            }

            let kind = series_kind(&series);
            debug!("Column '{}' ({}) has {} missing values", col_name, kind, missing);

            match kind {
                ColumnKind::Numeric => {
                    if missing == series.len() {
                        let notice = format!(
                            "Column '{}' has no values to impute from; leaving {} nulls",
                            col_name, missing
                        );
                        warn!("{}", notice);
                        outcome.warnings.push(notice);
                        continue;
                    }

                    let imputed = self.knn.impute_series(&series)?;
                    df.replace(&col_name, imputed)?;
                    outcome.actions.push(format!(
                        "KNN imputed '{}': {} values (K={})",
                        col_name,
                        missing,
                        self.knn.n_neighbors()
                    ));
                }
                ColumnKind::Text | ColumnKind::DateTime | ColumnKind::Other => {
                    let filled = fill_string_nulls(&series, &self.placeholder)?;
                    df.replace(&col_name, filled)?;
                    outcome.actions.push(format!(
                        "Filled '{}': {} values with \"{}\"",
                        col_name, missing, self.placeholder
                    ));
                }
            }
        }

        Ok((df, outcome))
    }
}
