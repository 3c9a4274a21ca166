//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline emits a [`ProgressUpdate`] when each stage starts and when it
//! finishes. Callers receive them through a [`ProgressReporter`], usually a
//! closure registered with the builder:
//!
//! ```rust,ignore
//! use lex_cleaning::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Pipeline is validating its input
    Initializing,
    /// Filling missing values (KNN for numbers, placeholder otherwise)
    Imputation,
    /// Normalizing text and filtering rows by language
    TextNormalization,
    /// Removing exact duplicate rows
    Deduplication,
    /// Parsing date columns and clearing NaN
    TypeCoercion,
    /// Dropping rows outside the IQR fences
    OutlierFiltering,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// The five data-transforming stages, in the order they run.
    pub const PROCESSING: [CleaningStage; 5] = [
        Self::Imputation,
        Self::TextNormalization,
        Self::Deduplication,
        Self::TypeCoercion,
        Self::OutlierFiltering,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Imputation => "Imputing Values",
            Self::TextNormalization => "Normalizing Text",
            Self::Deduplication => "Removing Duplicates",
            Self::TypeCoercion => "Coercing Types",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run attributed to this stage (0.0 - 1.0).
    ///
    /// Weights of the non-terminal stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.02,
            Self::Imputation => 0.33,
            Self::TextNormalization => 0.30,
            Self::Deduplication => 0.10,
            Self::TypeCoercion => 0.10,
            Self::OutlierFiltering => 0.15,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::Imputation => 0.02,
            Self::TextNormalization => 0.35,
            Self::Deduplication => 0.65,
            Self::TypeCoercion => 0.75,
            Self::OutlierFiltering => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl std::fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Row count at the time of the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Receives progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline can run on a
/// background thread while reporting elsewhere.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
