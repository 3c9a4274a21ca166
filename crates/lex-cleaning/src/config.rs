//! Configuration types for the cleaning pipeline.
//!
//! The stage order is fixed; what can be tuned are the parameters each stage
//! applies. Use [`CleaningConfig::builder()`] for a validated configuration.

use serde::{Deserialize, Serialize};

/// Default number of neighbors for numeric imputation.
pub const DEFAULT_KNN_NEIGHBORS: usize = 5;

/// Default fill value for absent non-numeric cells.
pub const DEFAULT_MISSING_PLACEHOLDER: &str = "Unknown";

/// Default fence multiplier for the IQR outlier filter.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default column-name prefix marking date columns.
pub const DEFAULT_DATE_PREFIX: &str = "date";

/// Default language kept by the language filter (ISO 639-3).
pub const DEFAULT_TARGET_LANGUAGE: &str = "eng";

/// Configuration for the cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .knn_neighbors(3)
///     .missing_placeholder("N/A")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Number of neighbors used when imputing numeric columns.
    /// Default: 5
    pub knn_neighbors: usize,

    /// Value written into absent cells of non-numeric columns.
    /// Default: "Unknown"
    pub missing_placeholder: String,

    /// Multiplier applied to the IQR when building the outlier fence.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Columns whose lowercased name starts with this prefix are parsed as dates.
    /// Default: "date"
    pub date_column_prefix: String,

    /// ISO 639-3 code of the language kept by the language filter.
    /// Default: "eng"
    pub target_language: String,

    /// Whether text columns are filtered by detected language.
    /// Default: true
    pub language_filter: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            knn_neighbors: DEFAULT_KNN_NEIGHBORS,
            missing_placeholder: DEFAULT_MISSING_PLACEHOLDER.to_string(),
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            date_column_prefix: DEFAULT_DATE_PREFIX.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            language_filter: true,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.knn_neighbors == 0 {
            return Err(ConfigValidationError::InvalidKnnNeighbors(
                self.knn_neighbors,
            ));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.date_column_prefix.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatePrefix);
        }

        if whatlang::Lang::from_code(self.target_language.as_str()).is_none() {
            return Err(ConfigValidationError::UnknownLanguage(
                self.target_language.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid KNN neighbors: {0} (must be at least 1)")]
    InvalidKnnNeighbors(usize),

    #[error("Invalid IQR multiplier: {0} (must be finite and non-negative)")]
    InvalidIqrMultiplier(f64),

    #[error("Date column prefix must not be empty")]
    EmptyDatePrefix,

    #[error("Unknown language code '{0}' (expected ISO 639-3, e.g. 'eng')")]
    UnknownLanguage(String),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    knn_neighbors: Option<usize>,
    missing_placeholder: Option<String>,
    iqr_multiplier: Option<f64>,
    date_column_prefix: Option<String>,
    target_language: Option<String>,
    language_filter: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set the number of neighbors for numeric imputation.
    pub fn knn_neighbors(mut self, k: usize) -> Self {
        self.knn_neighbors = Some(k);
        self
    }

    /// Set the placeholder written into absent non-numeric cells.
    pub fn missing_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_placeholder = Some(placeholder.into());
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the column-name prefix that marks date columns.
    pub fn date_column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.date_column_prefix = Some(prefix.into());
        self
    }

    /// Set the language kept by the language filter (ISO 639-3 code).
    pub fn target_language(mut self, code: impl Into<String>) -> Self {
        self.target_language = Some(code.into());
        self
    }

    /// Enable or disable the language filter.
    pub fn language_filter(mut self, enabled: bool) -> Self {
        self.language_filter = Some(enabled);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            knn_neighbors: self.knn_neighbors.unwrap_or(DEFAULT_KNN_NEIGHBORS),
            missing_placeholder: self
                .missing_placeholder
                .unwrap_or_else(|| DEFAULT_MISSING_PLACEHOLDER.to_string()),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
            date_column_prefix: self
                .date_column_prefix
                .unwrap_or_else(|| DEFAULT_DATE_PREFIX.to_string()),
            target_language: self
                .target_language
                .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()),
            language_filter: self.language_filter.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
