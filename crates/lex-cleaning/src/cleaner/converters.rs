//! Conversions into `Datetime(Milliseconds)` for date columns.

use crate::utils::{is_datetime_dtype, is_numeric_dtype, numeric_values};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Layouts tried after RFC 3339, most specific first.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

const NANOS_PER_MILLI: f64 = 1_000_000.0;

pub(crate) fn datetime_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Parse one string as a UTC timestamp in milliseconds.
pub(crate) fn parse_datetime_millis(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert a column of any dtype to `Datetime(Milliseconds)`.
///
/// Temporal columns are cast, numeric columns are read as epoch nanoseconds,
/// everything else is parsed as text. Unparseable values become null.
pub(crate) fn to_datetime(series: &Series) -> Result<Series> {
    let dtype = series.dtype();

    if is_datetime_dtype(dtype) {
        return Ok(series.cast(&datetime_dtype())?);
    }

    if is_numeric_dtype(dtype) {
        return epoch_nanos_to_datetime(series);
    }

    string_to_datetime(series)
}

/// Parse text values with the accepted date layouts.
pub(crate) fn string_to_datetime(series: &Series) -> Result<Series> {
    let text = series.cast(&DataType::String)?;
    let millis: Vec<Option<i64>> = text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_datetime_millis))
        .collect();

    Ok(Series::new(series.name().clone(), millis).cast(&datetime_dtype())?)
}

/// Interpret numbers as nanoseconds since the Unix epoch.
pub(crate) fn epoch_nanos_to_datetime(series: &Series) -> Result<Series> {
    let millis: Vec<Option<i64>> = numeric_values(series)?
        .into_iter()
        .map(|v| {
            v.filter(|x| x.is_finite())
                .map(|x| (x / NANOS_PER_MILLI).floor() as i64)
        })
        .collect();

    Ok(Series::new(series.name().clone(), millis).cast(&datetime_dtype())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis_at(series: &Series, idx: usize) -> Option<i64> {
        let physical = series.cast(&DataType::Int64).unwrap();
        physical.i64().unwrap().get(idx)
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_datetime_millis("2024-01-05"), Some(1_704_412_800_000));
    }

    #[test]
    fn test_parse_datetime_layouts_agree() {
        let expected = Some(1_704_456_000_000); // 2024-01-05 12:00:00 UTC
        assert_eq!(parse_datetime_millis("2024-01-05 12:00:00"), expected);
        assert_eq!(parse_datetime_millis("2024-01-05T12:00:00"), expected);
        assert_eq!(parse_datetime_millis("2024-01-05T12:00:00Z"), expected);
        assert_eq!(parse_datetime_millis("2024-01-05T14:00:00+02:00"), expected);
        assert_eq!(parse_datetime_millis("2024-01-05 12:00"), expected);
    }

    #[test]
    fn test_parse_alternate_date_layouts() {
        let expected = Some(1_704_412_800_000);
        assert_eq!(parse_datetime_millis("2024/01/05"), expected);
        assert_eq!(parse_datetime_millis("01/05/2024"), expected);
        assert_eq!(parse_datetime_millis("05.01.2024"), expected);
        assert_eq!(parse_datetime_millis("20240105"), expected);
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_datetime_millis("not-a-date"), None);
        assert_eq!(parse_datetime_millis(""), None);
        assert_eq!(parse_datetime_millis("notadate"), None);
        assert_eq!(parse_datetime_millis("2024-13-40"), None);
    }

    #[test]
    fn test_string_to_datetime() {
        let series = Series::new("date".into(), &[Some("2024-01-05"), Some("nope"), None]);
        let result = string_to_datetime(&series).unwrap();

        assert_eq!(result.dtype(), &datetime_dtype());
        assert_eq!(millis_at(&result, 0), Some(1_704_412_800_000));
        assert_eq!(result.null_count(), 2);
    }

    #[test]
    fn test_numeric_column_read_as_epoch_nanos() {
        let series = Series::new("date".into(), &[Some(1_704_412_800_000_000_000i64), None]);
        let result = to_datetime(&series).unwrap();

        assert_eq!(result.dtype(), &datetime_dtype());
        assert_eq!(millis_at(&result, 0), Some(1_704_412_800_000));
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_float_nan_becomes_null() {
        let series = Series::new("date".into(), &[0.0, f64::NAN]);
        let result = to_datetime(&series).unwrap();
        assert_eq!(millis_at(&result, 0), Some(0));
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_boolean_column_becomes_all_null() {
        let series = Series::new("date_flag".into(), &[true, false]);
        let result = to_datetime(&series).unwrap();
        assert_eq!(result.null_count(), 2);
    }
}
