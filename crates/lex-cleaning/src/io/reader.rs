//! Loading CSV and JSON files into a DataFrame.

use crate::error::{CleaningError, Result};
use crate::types::InputFormat;
use indexmap::IndexSet;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Read a table from `path`, choosing the format by extension.
///
/// The extension is checked before the file's existence, so a missing
/// `notes.txt` reports an unsupported format rather than a missing file.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let format = InputFormat::from_path(path).map_err(CleaningError::UnsupportedInputFormat)?;

    if !path.is_file() {
        return Err(CleaningError::InputNotFound(path.to_path_buf()));
    }

    info!("Loading {} as {:?}", path.display(), format);

    let df = match format {
        InputFormat::Csv => read_csv(path)?,
        InputFormat::Json => read_json(path)?,
    };

    debug!("Loaded shape: {:?}", (df.height(), df.width()));
    Ok(df)
}

fn malformed(path: &Path, reason: impl ToString) -> CleaningError {
    CleaningError::MalformedInput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| malformed(path, e))
}

/// Read a JSON array of row objects (or a single object as one row).
///
/// Columns are the union of all keys in first-seen order. Each column gets the
/// narrowest type that holds all its values: Boolean, Int64, Float64, or text.
fn read_json(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| malformed(path, e))?;

    let rows: Vec<Map<String, Value>> = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(malformed(
                    path,
                    format!("expected an array of objects, found element {}", other),
                )),
            })
            .collect::<Result<_>>()?,
        Value::Object(obj) => vec![obj],
        _ => return Err(malformed(path, "JSON must be an array or object")),
    };

    let mut column_names: IndexSet<String> = IndexSet::new();
    for row in &rows {
        for key in row.keys() {
            column_names.insert(key.clone());
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .map(|name| {
            let values: Vec<Option<&Value>> = rows
                .iter()
                .map(|row| row.get(name).filter(|v| !v.is_null()))
                .collect();
            json_column(name, &values).into()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Build a typed Series from the JSON values of one column.
fn json_column(name: &str, values: &[Option<&Value>]) -> Series {
    let present = || values.iter().flatten();

    let has_values = present().next().is_some();
    if has_values && present().all(|v| v.is_boolean()) {
        let data: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
        return Series::new(name.into(), data);
    }
    if has_values && present().all(|v| v.is_i64()) {
        let data: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
        return Series::new(name.into(), data);
    }
    if has_values && present().all(|v| v.is_number()) {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
        return Series::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .iter()
        .map(|v| {
            v.map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .collect();
    Series::new(name.into(), data)
}
