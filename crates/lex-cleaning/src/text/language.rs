//! Natural-language detection for the language filter.
//!
//! The filter only needs a yes/no answer per value, but detection itself can
//! fail (empty or too-short text, low confidence). A failure for any value of
//! a column disables the filter for that whole column.

use once_cell::sync::Lazy;
use thiserror::Error;
use whatlang::Detector;

static DETECTOR: Lazy<Detector> = Lazy::new(Detector::new);

/// Why a language could not be determined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("no text to detect a language from")]
    EmptyText,

    #[error("text has no recognizable language features")]
    NoFeatures,

    #[error("detection of '{lang}' is unreliable (confidence {confidence:.2})")]
    Unreliable { lang: String, confidence: f64 },
}

/// Detects the natural language of a piece of text.
///
/// Implementations return ISO 639-3 codes (`"eng"`, `"deu"`, ...). They must be
/// `Send + Sync` so a pipeline can be moved across threads.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<String, DetectionError>;
}

/// Trigram-based detector backed by `whatlang`.
///
/// Results whatlang flags as unreliable count as detection failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        if text.trim().is_empty() {
            return Err(DetectionError::EmptyText);
        }

        let info = DETECTOR.detect(text).ok_or(DetectionError::NoFeatures)?;
        if !info.is_reliable() {
            return Err(DetectionError::Unreliable {
                lang: info.lang().code().to_string(),
                confidence: info.confidence(),
            });
        }

        Ok(info.lang().code().to_string())
    }
}
