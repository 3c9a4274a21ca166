//! Text normalization stage with per-column language filtering.
//!
//! Every Text column is normalized value by value, then (optionally) filtered
//! so only rows whose cleaned text is in the target language survive. Columns
//! are processed in table order, so rows dropped while filtering one column
//! are already gone when the next column is processed.

mod language;
mod normalizer;
mod stopwords;

pub use language::{DetectionError, LanguageDetector, WhatlangDetector};
pub use normalizer::{normalize_surface, normalize_text, strip_emoji};
pub use stopwords::{is_stop_word, remove_stop_words};

use crate::types::ColumnKind;
use crate::utils::{column_names, keep_rows, series_kind};
use anyhow::Result;
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Second pipeline stage: text cleanup plus language filter.
pub struct TextNormalizer {
    detector: Arc<dyn LanguageDetector>,
    target_language: String,
    language_filter: bool,
}

/// Outcome of a normalization pass.
#[derive(Debug, Default)]
pub struct TextOutcome {
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
}

impl TextNormalizer {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        target_language: impl Into<String>,
        language_filter: bool,
    ) -> Self {
        Self {
            detector,
            target_language: target_language.into(),
            language_filter,
        }
    }

    /// Normalize every Text column, filtering rows by language after each one.
    pub fn normalize(&self, mut df: DataFrame) -> Result<(DataFrame, TextOutcome)> {
        let mut outcome = TextOutcome::default();

        info!("Normalizing text columns...");

        for col_name in column_names(&df) {
            let series = df.column(&col_name)?.as_materialized_series().clone();
            if series_kind(&series) != ColumnKind::Text {
                continue;
            }

            let normalized = normalize_series(&series)?;
            df.replace(&col_name, normalized)?;
            outcome
                .actions
                .push(format!("Normalized text in '{}'", col_name));
            debug!("Normalized text in '{}'", col_name);

            if self.language_filter {
                df = self.filter_language(df, &col_name, &mut outcome)?;
            }
        }

        Ok((df, outcome))
    }

    /// Drop rows whose value in `col_name` is not in the target language.
    ///
    /// If any value's language cannot be detected, the column is left unfiltered.
    fn filter_language(
        &self,
        df: DataFrame,
        col_name: &str,
        outcome: &mut TextOutcome,
    ) -> Result<DataFrame> {
        let values = df.column(col_name)?.str()?.clone();
        let mut keep = Vec::with_capacity(values.len());

        for value in values.into_iter() {
            match self.detector.detect(value.unwrap_or("")) {
                Ok(lang) => keep.push(lang == self.target_language),
                Err(e) => {
                    let notice = format!(
                        "Language detection failed for '{}' ({}); skipping language filter",
                        col_name, e
                    );
                    warn!("{}", notice);
                    outcome.warnings.push(notice);
                    return Ok(df);
                }
            }
        }

        let before = df.height();
        let df = keep_rows(&df, &keep)?;
        let removed = before - df.height();
        if removed > 0 {
            outcome.actions.push(format!(
                "Removed {} rows whose '{}' is not '{}'",
                removed, col_name, self.target_language
            ));
            debug!("Language filter removed {} rows via '{}'", removed, col_name);
        }

        Ok(df)
    }
}

/// Apply [`normalize_text`] to every value of a text series; nulls stay null.
pub fn normalize_series(series: &Series) -> Result<Series> {
    let text = series.cast(&DataType::String)?;
    let normalized: Vec<Option<String>> = text
        .str()?
        .into_iter()
        .map(|v| v.map(normalize_text))
        .collect();

    Ok(Series::new(series.name().clone(), normalized))
}
