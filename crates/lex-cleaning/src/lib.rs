//! Tabular Data Cleaning Library
//!
//! A fixed-order cleaning pipeline for CSV and JSON datasets, built on Polars.
//!
//! # Overview
//!
//! Every run applies the same five stages, in order:
//!
//! 1. **Imputation**: numeric gaps filled by K-nearest-neighbors, everything
//!    else filled with a placeholder (`"Unknown"`)
//! 2. **Text normalization**: lowercase, strip tags, punctuation, digits, emoji
//!    and English stop words, then drop rows whose text is not in the target
//!    language
//! 3. **Deduplication**: exact duplicate rows removed, first occurrence kept
//! 4. **Type coercion**: `date*` columns parsed as datetimes, NaN cleared
//! 5. **Outlier filtering**: rows outside the IQR fences removed, one numeric
//!    column at a time
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_cleaning::{clean, convert};
//! use std::path::Path;
//!
//! // Clean a CSV and save it as JSON next to it
//! let saved = clean(Path::new("reviews.csv"), "reviews_clean.json", "json", Path::new("."))?;
//! println!("Cleaned data saved to {}", saved.display());
//!
//! // Convert without cleaning
//! convert(Path::new("reviews.json"), "csv", "reviews.csv", Path::new("out"))?;
//! ```
//!
//! # Pipeline API
//!
//! For in-memory DataFrames, custom configuration or progress reporting:
//!
//! ```rust,ignore
//! use lex_cleaning::{CleaningConfig, Pipeline};
//!
//! let config = CleaningConfig::builder()
//!     .knn_neighbors(3)
//!     .iqr_multiplier(3.0)
//!     .language_filter(false)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! for stage in &outcome.summary.stages {
//!     println!("{:?}: {} -> {}", stage.stage, stage.rows_before, stage.rows_after);
//! }
//! ```
//!
//! # Language detection
//!
//! The language filter uses [`WhatlangDetector`] by default. Any
//! [`LanguageDetector`] can be supplied through
//! [`PipelineBuilder::language_detector`]. If detection fails for any value
//! of a column, that column is left unfiltered and a warning is recorded.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod ops;
pub mod pipeline;
pub mod text;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, TypeCoercer};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::{KNNImputer, MissingValueImputer};
pub use io::{read_table, write_table};
pub use ops::{CleanReport, clean, clean_with, convert};
pub use pipeline::{
    CleaningExecutor, CleaningOutcome, CleaningStage, ClosureProgressReporter, OutlierHandler,
    Pipeline, PipelineBuilder, ProgressReporter, ProgressUpdate,
};
pub use text::{DetectionError, LanguageDetector, TextNormalizer, WhatlangDetector, normalize_text};
pub use types::{CleaningSummary, ColumnKind, InputFormat, OutputFormat, StageReport};
