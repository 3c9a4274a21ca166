//! Writing a DataFrame as CSV or as a JSON array of row objects.

use crate::error::Result;
use crate::types::OutputFormat;
use crate::utils::{is_float_dtype, is_numeric_dtype};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const JSON_INDENT: &[u8] = b"    ";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Write `df` to `path` in the given format, replacing any existing file.
pub fn write_table(df: &mut DataFrame, format: OutputFormat, path: &Path) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(df, path)?,
        OutputFormat::Json => write_json(df, path)?,
    }

    info!("Saved {} rows as {} to {}", df.height(), format, path.display());
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;
    Ok(())
}

fn write_json(df: &DataFrame, path: &Path) -> Result<()> {
    let rows = to_json_rows(df)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    Value::Array(rows).serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

/// One JSON object per row, keys in column order.
pub fn to_json_rows(df: &DataFrame) -> Result<Vec<Value>> {
    let columns: Vec<(String, Vec<Value>)> = df
        .get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            Ok((series.name().to_string(), json_values(series)?))
        })
        .collect::<Result<_>>()?;

    let rows = (0..df.height())
        .map(|row| {
            let mut object = Map::with_capacity(columns.len());
            for (name, values) in &columns {
                object.insert(name.clone(), values[row].clone());
            }
            Value::Object(object)
        })
        .collect();

    Ok(rows)
}

/// JSON value for every cell of a column. Absent values (null, NaN) map to `null`.
fn json_values(series: &Series) -> PolarsResult<Vec<Value>> {
    let dtype = series.dtype();

    if dtype == &DataType::Boolean {
        return Ok(series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect());
    }

    if is_float_dtype(dtype) {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|v| v.and_then(Number::from_f64).map_or(Value::Null, Value::Number))
            .collect());
    }

    if dtype == &DataType::UInt64 {
        return Ok(series
            .u64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, |x| Value::Number(x.into())))
            .collect());
    }

    if is_numeric_dtype(dtype) {
        let ints = series.cast(&DataType::Int64)?;
        return Ok(ints
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, |x| Value::Number(x.into())))
            .collect());
    }

    if matches!(dtype, DataType::Datetime(_, _) | DataType::Date) {
        let millis = series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        return Ok(millis
            .i64()?
            .into_iter()
            .map(|v| {
                v.and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map_or(Value::Null, |dt| {
                        Value::String(dt.naive_utc().format(ISO_FORMAT).to_string())
                    })
            })
            .collect());
    }

    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
        .collect())
}
