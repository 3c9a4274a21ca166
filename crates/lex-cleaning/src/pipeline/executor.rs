//! Cleaning executor module.
//!
//! Runs the five data-transforming stages in their fixed order and records a
//! [`StageReport`] for each.

use crate::cleaner::{DataCleaner, TypeCoercer};
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::MissingValueImputer;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{CleaningStage, ProgressUpdate};
use crate::text::{LanguageDetector, TextNormalizer};
use crate::types::{CleaningSummary, StageReport};
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// What a stage hands back besides the table: actions taken and notices raised.
type StageOutput = (DataFrame, Vec<String>, Vec<String>);

/// Executes the cleaning stages on a DataFrame.
pub struct CleaningExecutor {
    imputer: MissingValueImputer,
    normalizer: TextNormalizer,
    cleaner: DataCleaner,
    coercer: TypeCoercer,
    outliers: OutlierHandler,
}

impl CleaningExecutor {
    pub fn new(config: &CleaningConfig, detector: Arc<dyn LanguageDetector>) -> Self {
        Self {
            imputer: MissingValueImputer::new(
                config.knn_neighbors,
                config.missing_placeholder.clone(),
            ),
            normalizer: TextNormalizer::new(
                detector,
                config.target_language.clone(),
                config.language_filter,
            ),
            cleaner: DataCleaner,
            coercer: TypeCoercer::new(config.date_column_prefix.clone()),
            outliers: OutlierHandler::new(config.iqr_multiplier),
        }
    }

    /// Run imputation, text normalization, deduplication, type coercion and
    /// outlier filtering, in that order.
    ///
    /// Stage reports and warnings are appended to `summary`; `report` receives
    /// a progress update at the start and end of every stage.
    pub fn execute(
        &self,
        df: DataFrame,
        summary: &mut CleaningSummary,
        report: &dyn Fn(ProgressUpdate),
    ) -> Result<DataFrame> {
        let df = self.run_stage(CleaningStage::Imputation, df, summary, report, |df| {
            let (df, outcome) = self.imputer.impute(df)?;
            Ok((df, outcome.actions, outcome.warnings))
        })?;

        let df = self.run_stage(CleaningStage::TextNormalization, df, summary, report, |df| {
            let (df, outcome) = self.normalizer.normalize(df)?;
            Ok((df, outcome.actions, outcome.warnings))
        })?;

        let df = self.run_stage(CleaningStage::Deduplication, df, summary, report, |df| {
            let (df, actions) = self.cleaner.remove_duplicates(df)?;
            Ok((df, actions, Vec::new()))
        })?;

        let df = self.run_stage(CleaningStage::TypeCoercion, df, summary, report, |df| {
            let (df, outcome) = self.coercer.coerce(df)?;
            Ok((df, outcome.actions, outcome.warnings))
        })?;

        self.run_stage(CleaningStage::OutlierFiltering, df, summary, report, |df| {
            let (df, actions) = self.outliers.remove_outliers(df)?;
            Ok((df, actions, Vec::new()))
        })
    }

    fn run_stage<F>(
        &self,
        stage: CleaningStage,
        df: DataFrame,
        summary: &mut CleaningSummary,
        report: &dyn Fn(ProgressUpdate),
        run: F,
    ) -> Result<DataFrame>
    where
        F: FnOnce(DataFrame) -> anyhow::Result<StageOutput>,
    {
        let rows_before = df.height();
        report(
            ProgressUpdate::new(stage, 0.0, format!("{}...", stage.display_name()))
                .with_rows(rows_before),
        );

        let (df, actions, warnings) =
            run(df).map_err(|e| CleaningError::stage(stage.display_name(), format!("{:#}", e)))?;

        let mut stage_report = StageReport::new(stage, rows_before);
        stage_report.rows_after = df.height();
        stage_report.actions = actions;

        info!(
            "{}: {} -> {} rows",
            stage.display_name(),
            stage_report.rows_before,
            stage_report.rows_after
        );
        for action in &stage_report.actions {
            debug!("  {}", action);
        }

        summary.stages.push(stage_report);
        summary.warnings.extend(warnings);

        report(
            ProgressUpdate::new(stage, 1.0, format!("{} complete", stage.display_name()))
                .with_rows(df.height()),
        );

        Ok(df)
    }
}
