//! Integration tests for the cleaning pipeline.
//!
//! These tests drive the public file-level operations end to end, reading
//! real files from a temporary directory and inspecting what was written.

use lex_cleaning::{
    CleaningConfig, CleaningError, CleaningStage, DetectionError, LanguageDetector, Pipeline,
    ProgressUpdate, clean, clean_with, convert, read_table,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Reports every text as English so the language filter keeps all rows.
struct AlwaysEnglish;

impl LanguageDetector for AlwaysEnglish {
    fn detect(&self, _text: &str) -> Result<String, DetectionError> {
        Ok("eng".to_string())
    }
}

/// English unless the text contains a marker word.
struct MarkerDetector;

impl LanguageDetector for MarkerDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        if text.contains("bonjour") {
            Ok("fra".to_string())
        } else {
            Ok("eng".to_string())
        }
    }
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_json_rows(path: &Path) -> Vec<Value> {
    let content = fs::read_to_string(path).unwrap();
    match serde_json::from_str(&content).unwrap() {
        Value::Array(rows) => rows,
        other => panic!("expected a JSON array, got {}", other),
    }
}

fn pipeline_with(detector: Arc<dyn LanguageDetector>) -> Pipeline {
    Pipeline::builder()
        .language_detector(detector)
        .build()
        .unwrap()
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_clean_csv_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "reviews.csv",
        "id,date_signup,comment\n\
         1,not-a-date,<b>Hello!!</b> 123 😀 the\n\
         2,not-a-date,good service\n\
         3,not-a-date,fast delivery\n",
    );

    let report = clean_with(
        &pipeline_with(Arc::new(AlwaysEnglish)),
        &input,
        "clean.json",
        "json",
        dir.path(),
    )
    .unwrap();

    assert_eq!(report.output_path, dir.path().join("clean.json"));
    let rows = read_json_rows(&report.output_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], Value::from(1));
    assert_eq!(rows[0]["comment"], Value::from("hello"));
    assert_eq!(rows[0]["date_signup"], Value::Null);
    assert_eq!(rows[1]["comment"], Value::from("good service"));
}

#[test]
fn test_clean_with_default_detector_skips_unreliable_filter() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "reviews.csv",
        "id,date_signup,comment\n1,not-a-date,<b>Hello!!</b> 123 😀 the\n",
    );

    let saved = clean(&input, "out.json", "json", dir.path()).unwrap();
    assert_eq!(saved, dir.path().join("out.json"));

    let rows = read_json_rows(&saved);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["comment"], Value::from("hello"));
    assert_eq!(rows[0]["date_signup"], Value::Null);

    // Same run through the pipeline API to inspect the warnings.
    let pipeline = Pipeline::builder().build().unwrap();
    let report = clean_with(&pipeline, &input, "again.json", "json", dir.path()).unwrap();
    assert_eq!(report.summary.rows_after, 1);
    assert!(
        report
            .summary
            .warnings
            .iter()
            .any(|w| w.contains("'comment'") && w.contains("skipping language filter")),
        "warnings: {:?}",
        report.summary.warnings
    );
}

#[test]
fn test_clean_reports_every_stage_in_order() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "a,b\n1,apple\n2,pear\n2,pear\n3,plum\n");

    let report = clean_with(
        &pipeline_with(Arc::new(AlwaysEnglish)),
        &input,
        "out.csv",
        "csv",
        dir.path(),
    )
    .unwrap();

    let stages: Vec<CleaningStage> = report.summary.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, CleaningStage::PROCESSING.to_vec());

    let dedup = report.summary.stage(CleaningStage::Deduplication).unwrap();
    assert_eq!(dedup.rows_removed(), 1);
    assert_eq!(report.summary.rows_before, 4);
    assert_eq!(report.summary.rows_after, 3);
}

#[test]
fn test_clean_unknown_format_falls_back_to_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "a\n1\n2\n");

    let report = clean_with(
        &pipeline_with(Arc::new(AlwaysEnglish)),
        &input,
        "out.xml",
        "xml",
        dir.path(),
    )
    .unwrap();

    let content = fs::read_to_string(&report.output_path).unwrap();
    assert_eq!(content, "a\n1\n2\n");
    assert!(report.summary.warnings.iter().any(|w| w.contains("xml")));
}

#[test]
fn test_clean_json_input_fills_missing_values() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "rows.json",
        r#"[
            {"x": 1.0, "y": 10.0, "city": "paris"},
            {"x": 2.0, "y": null, "city": null},
            {"x": 3.0, "y": 30.0, "city": "rome"}
        ]"#,
    );

    let report = clean_with(
        &pipeline_with(Arc::new(AlwaysEnglish)),
        &input,
        "out.json",
        "json",
        dir.path(),
    )
    .unwrap();

    let rows = read_json_rows(&report.output_path);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["y"].is_number()));
    assert_eq!(rows[1]["city"], Value::from("unknown"));
}

#[test]
fn test_language_filter_drops_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "data.csv",
        "id,comment\n1,great product\n2,bonjour madame\n3,works well\n",
    );

    let report = clean_with(
        &pipeline_with(Arc::new(MarkerDetector)),
        &input,
        "out.json",
        "json",
        dir.path(),
    )
    .unwrap();

    let rows = read_json_rows(&report.output_path);
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_language_filter_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "id,comment\n1,great\n2,bonjour\n3,fine\n");

    let pipeline = Pipeline::builder()
        .config(CleaningConfig::builder().language_filter(false).build().unwrap())
        .language_detector(Arc::new(MarkerDetector))
        .build()
        .unwrap();
    let report = clean_with(&pipeline, &input, "out.csv", "csv", dir.path()).unwrap();

    assert_eq!(report.summary.rows_after, 3);
}

#[test]
fn test_progress_callback_sees_all_stages() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "a\n1\n2\n3\n");

    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let pipeline = Pipeline::builder()
        .language_detector(Arc::new(AlwaysEnglish))
        .on_progress(move |update| sink.lock().unwrap().push(update))
        .build()
        .unwrap();

    clean_with(&pipeline, &input, "out.csv", "csv", dir.path()).unwrap();

    let updates = updates.lock().unwrap();
    let last = updates.last().unwrap();
    assert_eq!(last.stage, CleaningStage::Complete);
    assert_eq!(last.progress, 1.0);
    for stage in CleaningStage::PROCESSING {
        assert!(updates.iter().any(|u| u.stage == stage), "missing {:?}", stage);
    }
    assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress));
}

#[test]
fn test_clean_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = clean(&dir.path().join("absent.csv"), "out.csv", "csv", dir.path()).unwrap_err();

    assert!(matches!(err, CleaningError::InputNotFound(_)));
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn test_clean_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "notes.txt", "hello");

    let err = clean(&input, "out.csv", "csv", dir.path()).unwrap_err();
    assert!(matches!(err, CleaningError::UnsupportedInputFormat(_)));
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_convert_csv_to_json_applies_no_cleaning() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "people.csv",
        "name,age\n\"Hello, World! <b>The</b> 42\",31\nbob,\ncid,27\n",
    );
    let out_dir = dir.path().join("converted");

    let path = convert(&input, "json", "people.json", &out_dir).unwrap();

    assert_eq!(path, out_dir.join("people.json"));
    let rows = read_json_rows(&path);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let keys: Vec<&String> = row.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "age"]);
    }
    assert_eq!(rows[0]["name"], Value::from("Hello, World! <b>The</b> 42"));
    assert_eq!(rows[1]["age"], Value::Null);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(r#""name": "Hello, World! <b>The</b> 42""#));
}

#[test]
fn test_convert_json_to_csv_roundtrips_through_reader() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "rows.json", r#"[{"k": "a", "v": 1}, {"k": "b", "v": 2}]"#);

    let path = convert(&input, "csv", "rows.csv", dir.path()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "k,v\na,1\nb,2\n");
    let df = read_table(&path).unwrap();
    assert_eq!(df.shape(), (2, 2));
}

#[test]
fn test_convert_refuses_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "a\n1\n");

    let err = convert(&input, "parquet", "out.parquet", dir.path()).unwrap_err();
    assert!(matches!(err, CleaningError::UnsupportedOutputFormat(_)));
    assert!(!dir.path().join("out.parquet").exists());
}
