use crate::constants::{MISSING_MARKERS, SOURCE_DATE_COLUMN};
use crate::error::ExtractionError;
use crate::types::{Column, ColumnType, RecordBatch, Row, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a `YYYY-MM-DD` cutoff.
pub fn parse_cutoff(cutoff: &str) -> Result<NaiveDate, ExtractionError> {
    NaiveDate::parse_from_str(cutoff.trim(), "%Y-%m-%d")
        .map_err(|_| ExtractionError::InvalidCutoff(cutoff.to_string()))
}

/// Reads the CSV at `csv_path` and keeps the rows dated strictly before `cutoff`.
pub fn extract(csv_path: &Path, cutoff: NaiveDate) -> Result<RecordBatch, ExtractionError> {
    let result = ReaderBuilder::new()
        .from_path(csv_path)
        .map_err(|source| ExtractionError::Open {
            path: csv_path.to_path_buf(),
            source,
        })
        .and_then(|reader| read_and_filter(reader, csv_path, cutoff));

    if let Err(e) = &result {
        error!("Extraction failed: {}", e);
    }
    result
}

/// Same as [`extract`] for an already opened source; `label` names it in errors.
pub fn extract_from_reader<R: Read>(
    source: R,
    label: &str,
    cutoff: NaiveDate,
) -> Result<RecordBatch, ExtractionError> {
    let reader = ReaderBuilder::new().from_reader(source);
    let result = read_and_filter(reader, Path::new(label), cutoff);
    if let Err(e) = &result {
        error!("Extraction failed: {}", e);
    }
    result
}

fn read_and_filter<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
    cutoff: NaiveDate,
) -> Result<RecordBatch, ExtractionError> {
    let csv_err = |source: csv::Error| ExtractionError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_err)?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == SOURCE_DATE_COLUMN)
        .ok_or_else(|| ExtractionError::MissingDateColumn {
            path: path.to_path_buf(),
            column: SOURCE_DATE_COLUMN.to_string(),
        })?;

    let mut records: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(csv_err)?);
    }

    let mut dates = Vec::with_capacity(records.len());
    for record in &records {
        let cell = record.get(date_idx).unwrap_or_default();
        if is_missing(cell) {
            dates.push(None);
            continue;
        }
        let ts = parse_timestamp(cell).ok_or_else(|| ExtractionError::InvalidDate {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            value: cell.to_string(),
        })?;
        dates.push(Some(ts));
    }

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let column_type = if idx == date_idx {
                ColumnType::Timestamp
            } else {
                infer_column_type(records.iter().map(|r| r.get(idx).unwrap_or_default()))
            };
            Column::new(name, column_type)
        })
        .collect();

    info!("CSV loaded successfully with {} rows.", records.len());

    let cutoff_ts = cutoff.and_time(NaiveTime::MIN);
    let rows: Vec<Row> = records
        .iter()
        .zip(dates)
        .filter(|(_, date)| matches!(date, Some(ts) if *ts < cutoff_ts))
        .map(|(record, date)| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    if idx == date_idx {
                        date.map(Value::Timestamp).unwrap_or(Value::Null)
                    } else {
                        to_value(record.get(idx).unwrap_or_default(), column.column_type)
                    }
                })
                .collect()
        })
        .collect();

    info!("Filtered data to {} rows before {}.", rows.len(), cutoff);
    debug!(
        "Extracted columns: {:?}",
        columns.iter().map(|c| (&c.name, c.column_type)).collect::<Vec<_>>()
    );

    Ok(RecordBatch::new(columns, rows))
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Accepts dates, naive date-times and RFC 3339 timestamps (converted to UTC).
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(cell)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut all_integer = true;
    let mut all_real = true;

    for cell in cells.filter(|c| !is_missing(c)) {
        let cell = cell.trim();
        if all_integer && cell.parse::<i64>().is_err() {
            all_integer = false;
        }
        if cell.parse::<f64>().is_err() {
            all_real = false;
            break;
        }
    }

    match (all_integer, all_real) {
        (true, true) => ColumnType::Integer,
        (_, true) => ColumnType::Real,
        _ => ColumnType::Text,
    }
}

fn to_value(cell: &str, column_type: ColumnType) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }
    match column_type {
        ColumnType::Integer => cell.trim().parse().map(Value::Integer).unwrap_or(Value::Null),
        ColumnType::Real => cell.trim().parse().map(Value::Real).unwrap_or(Value::Null),
        ColumnType::Text => Value::Text(cell.to_string()),
        ColumnType::Timestamp => parse_timestamp(cell).map(Value::Timestamp).unwrap_or(Value::Null),
    }
}
