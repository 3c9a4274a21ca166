//! Error types for the cleaning pipeline.
//!
//! Only two conditions abort a run before any stage executes: the input file
//! does not exist, or its extension is not a supported input format. Every
//! other irregularity (undetectable language, unimputable column, unparseable
//! value) is a non-fatal notice recorded in the run summary.
//!
//! Errors serialize as `{code, message}` so the CLI can emit them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Input path does not resolve to a readable file.
    #[error("Input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// Input extension is neither `.csv` nor `.json`.
    #[error("Unsupported file format '{0}'. Please provide a CSV or JSON file.")]
    UnsupportedInputFormat(String),

    /// Output format tag is neither `csv` nor `json`.
    #[error("Invalid output format '{0}'. Please choose 'csv' or 'json'.")]
    UnsupportedOutputFormat(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file exists but could not be turned into a table.
    #[error("Failed to read '{}': {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// A pipeline stage failed unexpectedly.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::UnsupportedInputFormat(_) => "UNSUPPORTED_INPUT_FORMAT",
            Self::UnsupportedOutputFormat(_) => "UNSUPPORTED_OUTPUT_FORMAT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
            Self::StageFailed { .. } => "STAGE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True for the two conditions that stop a run before any stage executes.
    pub fn is_abort(&self) -> bool {
        match self {
            Self::InputNotFound(_) | Self::UnsupportedInputFormat(_) => true,
            Self::WithContext { source, .. } => source.is_abort(),
            _ => false,
        }
    }

    /// Wrap a stage-internal failure.
    pub(crate) fn stage(stage: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CleaningError::StageFailed {
            stage: stage.into(),
            reason: err.to_string(),
        }
    }
}

impl From<crate::config::ConfigValidationError> for CleaningError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
