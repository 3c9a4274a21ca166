//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow.

use crate::config::{CleaningConfig, ConfigValidationError};
use crate::error::Result;
use crate::pipeline::CleaningExecutor;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::text::{LanguageDetector, WhatlangDetector};
use crate::types::CleaningSummary;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Share of removed rows above which the summary carries a data-loss warning.
const HIGH_DATA_LOSS_PCT: f32 = 30.0;

/// Cleaned table plus what happened to it.
#[derive(Debug)]
pub struct CleaningOutcome {
    pub data: DataFrame,
    pub summary: CleaningSummary,
}

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::{CleaningConfig, Pipeline};
///
/// let outcome = Pipeline::builder()
///     .config(CleaningConfig::builder().knn_neighbors(3).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} rows left", outcome.summary.rows_after);
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    executor: CleaningExecutor,
}

// Pipeline can be moved to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run all cleaning stages over `df`.
    ///
    /// Stages never add or drop columns. Non-fatal conditions end up in
    /// `summary.warnings`; only unexpected internal failures return `Err`.
    pub fn process(&self, df: DataFrame) -> Result<CleaningOutcome> {
        match self.process_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline...");
        self.report_progress(
            ProgressUpdate::new(
                CleaningStage::Initializing,
                0.0,
                "Starting cleaning pipeline...",
            )
            .with_rows(df.height()),
        );

        let mut summary = CleaningSummary::new();
        summary.rows_before = df.height();
        summary.columns = df.width();

        info!("Input shape: {:?}", (df.height(), df.width()));

        let df = self
            .executor
            .execute(df, &mut summary, &|update| self.report_progress(update))?;

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = df.height();

        if summary.rows_removed_percentage() > HIGH_DATA_LOSS_PCT {
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }

        info!(
            "Cleaning completed in {}ms: {} -> {} rows",
            summary.duration_ms, summary.rows_before, summary.rows_after
        );

        Ok(CleaningOutcome { data: df, summary })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Without an explicit detector the pipeline uses [`WhatlangDetector`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    language_detector: Option<Arc<dyn LanguageDetector>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the language detector used by the language filter.
    pub fn language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language_detector = Some(detector);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let detector = self
            .language_detector
            .unwrap_or_else(|| Arc::new(WhatlangDetector));
        let executor = CleaningExecutor::new(&config, detector);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            executor,
        })
    }
}
