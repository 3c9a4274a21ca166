//! Pipeline module.
//!
//! This module provides the cleaning pipeline and related components.

mod builder;
mod executor;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningOutcome, Pipeline, PipelineBuilder};
pub use executor::CleaningExecutor;
pub use outliers::OutlierHandler;
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
