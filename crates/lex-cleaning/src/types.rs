use crate::pipeline::progress::CleaningStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Classification of a column's values, dispatched on by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// Free text
    Text,
    /// Date, datetime or time values
    DateTime,
    /// Anything else (booleans, nested values)
    Other,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::DateTime => "datetime",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect the format from the path's extension (case-insensitive).
    ///
    /// Returns the unrecognized extension (or the whole file name when there is
    /// none) as the error value.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(other.to_string()),
            None => Err(path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()),
        }
    }
}

/// Output serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// Parse a format tag (case-insensitive, surrounding whitespace ignored).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse a format tag, falling back to CSV with a warning for unknown tags.
    pub fn parse_or_csv(tag: &str) -> (Self, Option<String>) {
        match Self::parse(tag) {
            Some(format) => (format, None),
            None => {
                let notice = format!("Invalid output format '{}'. Saving as CSV.", tag);
                warn!("{}", notice);
                (Self::Csv, Some(notice))
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// Run Summary Types
// ============================================================================

/// Summary of what one stage did to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage this report belongs to.
    pub stage: CleaningStage,
    /// Row count entering the stage.
    pub rows_before: usize,
    /// Row count leaving the stage.
    pub rows_after: usize,
    /// Human-readable descriptions of what the stage changed.
    pub actions: Vec<String>,
}

impl StageReport {
    pub fn new(stage: CleaningStage, rows_before: usize) -> Self {
        Self {
            stage,
            rows_before,
            rows_after: rows_before,
            actions: Vec::new(),
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Human-readable summary of a full cleaning run.
///
/// Serialized as-is by the CLI's `--json` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before cleaning.
    pub rows_before: usize,
    /// Number of rows after cleaning.
    pub rows_after: usize,

    /// Number of columns (stages never add or drop columns).
    pub columns: usize,

    /// One report per executed stage, in execution order.
    pub stages: Vec<StageReport>,

    /// Non-fatal notices raised during the run.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Number of rows removed over the whole run.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed() as f32 / self.rows_before as f32) * 100.0
        }
    }

    /// Look up the report for a given stage.
    pub fn stage(&self, stage: CleaningStage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(
            InputFormat::from_path(&PathBuf::from("data.csv")),
            Ok(InputFormat::Csv)
        );
        assert_eq!(
            InputFormat::from_path(&PathBuf::from("dir/DATA.JSON")),
            Ok(InputFormat::Json)
        );
        assert_eq!(
            InputFormat::from_path(&PathBuf::from("data.xlsx")),
            Err("xlsx".to_string())
        );
        assert_eq!(
            InputFormat::from_path(&PathBuf::from("README")),
            Err("README".to_string())
        );
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::parse(" JSON "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("parquet"), None);
    }

    #[test]
    fn test_output_format_falls_back_to_csv() {
        let (format, notice) = OutputFormat::parse_or_csv("xml");
        assert_eq!(format, OutputFormat::Csv);
        assert!(notice.unwrap().contains("Saving as CSV"));

        let (format, notice) = OutputFormat::parse_or_csv("json");
        assert_eq!(format, OutputFormat::Json);
        assert!(notice.is_none());
    }

    #[test]
    fn test_summary_rows_removed() {
        let mut summary = CleaningSummary::new();
        summary.rows_before = 10;
        summary.rows_after = 7;
        assert_eq!(summary.rows_removed(), 3);
        assert!((summary.rows_removed_percentage() - 30.0).abs() < 1e-4);

        let empty = CleaningSummary::new();
        assert_eq!(empty.rows_removed_percentage(), 0.0);
    }

    #[test]
    fn test_stage_report_rows_removed() {
        let mut report = StageReport::new(CleaningStage::Deduplication, 5);
        assert_eq!(report.rows_removed(), 0);
        report.rows_after = 3;
        assert_eq!(report.rows_removed(), 2);
    }
}
