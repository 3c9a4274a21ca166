//! File-level operations: clean a file, or convert it between formats.

use crate::error::{CleaningError, Result, ResultExt};
use crate::io::{read_table, write_table};
use crate::pipeline::Pipeline;
use crate::types::{CleaningSummary, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of [`clean_with`]: where the table went and what happened to it.
#[derive(Debug)]
pub struct CleanReport {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub summary: CleaningSummary,
}

/// Clean `input` with the default pipeline and save it to
/// `target_directory/output_filename`.
///
/// An unknown `output_format` falls back to CSV with a warning.
pub fn clean(
    input: &Path,
    output_filename: &str,
    output_format: &str,
    target_directory: &Path,
) -> Result<PathBuf> {
    let pipeline = Pipeline::builder().build()?;
    let report = clean_with(&pipeline, input, output_filename, output_format, target_directory)?;
    Ok(report.output_path)
}

/// Like [`clean`], with a caller-supplied pipeline; also returns the run summary.
pub fn clean_with(
    pipeline: &Pipeline,
    input: &Path,
    output_filename: &str,
    output_format: &str,
    target_directory: &Path,
) -> Result<CleanReport> {
    let df = read_table(input)?;
    let outcome = pipeline.process(df)?;
    let mut data = outcome.data;
    let mut summary = outcome.summary;

    let (format, notice) = OutputFormat::parse_or_csv(output_format);
    if let Some(notice) = notice {
        summary.add_warning(notice);
    }

    let output_path = destination(target_directory, output_filename)?;
    write_table(&mut data, format, &output_path)
        .context(format!("Failed to save {}", output_path.display()))?;

    info!("Cleaned data saved to {}", output_path.display());
    Ok(CleanReport {
        output_path,
        format,
        summary,
    })
}

/// Read `input` and write it unchanged in another format.
///
/// Unlike [`clean`], an unknown `output_format` is refused and nothing is written.
pub fn convert(
    input: &Path,
    output_format: &str,
    output_filename: &str,
    target_directory: &Path,
) -> Result<PathBuf> {
    let mut df = read_table(input)?;

    let format = OutputFormat::parse(output_format)
        .ok_or_else(|| CleaningError::UnsupportedOutputFormat(output_format.to_string()))?;

    let output_path = destination(target_directory, output_filename)?;
    write_table(&mut df, format, &output_path)
        .context(format!("Failed to save {}", output_path.display()))?;

    info!("File converted and saved to {}", output_path.display());
    Ok(output_path)
}

fn destination(target_directory: &Path, output_filename: &str) -> Result<PathBuf> {
    if !target_directory.as_os_str().is_empty() {
        fs::create_dir_all(target_directory)?;
    }
    Ok(target_directory.join(output_filename))
}
