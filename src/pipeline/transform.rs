use crate::constants::{DATE_COLUMN, REQUIRED_COLUMNS, SYMBOL_COLUMN};
use crate::error::TransformationError;
use crate::types::{RecordBatch, Value};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Trims, lowercases and replaces spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Cleans a batch: normalizes column names, drops rows missing a
/// required field, then keeps the first row for each (symbol, date) pair.
pub fn transform(batch: RecordBatch) -> Result<RecordBatch, TransformationError> {
    let result = clean(batch);
    if let Err(e) = &result {
        error!("Transformation failed: {}", e);
    }
    result
}

fn clean(mut batch: RecordBatch) -> Result<RecordBatch, TransformationError> {
    normalize_columns(&mut batch)?;

    let required: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            batch
                .column_index(name)
                .ok_or_else(|| TransformationError::MissingColumn(name.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let before = batch.len();
    batch
        .rows
        .retain(|row| required.iter().all(|&idx| !row[idx].is_null()));
    let dropped_nulls = before - batch.len();

    let dropped_duplicates = drop_duplicate_keys(&mut batch);

    info!(
        "Transformation complete. {} rows kept ({} missing required fields, {} duplicates removed).",
        batch.len(),
        dropped_nulls,
        dropped_duplicates
    );
    Ok(batch)
}

fn normalize_columns(batch: &mut RecordBatch) -> Result<(), TransformationError> {
    let mut seen: Vec<(String, String)> = Vec::with_capacity(batch.columns.len());

    for column in &mut batch.columns {
        let normalized = normalize_column_name(&column.name);
        if let Some((original, _)) = seen.iter().find(|(_, n)| *n == normalized) {
            return Err(TransformationError::DuplicateColumn {
                first: original.clone(),
                second: column.name.clone(),
                normalized,
            });
        }
        if normalized != column.name {
            debug!("Renamed column {:?} -> {:?}", column.name, normalized);
        }
        seen.push((column.name.clone(), normalized.clone()));
        column.name = normalized;
    }
    Ok(())
}

/// Keeps the first occurrence of each natural key; returns how many rows went.
fn drop_duplicate_keys(batch: &mut RecordBatch) -> usize {
    let (Some(symbol_idx), Some(date_idx)) = (
        batch.column_index(SYMBOL_COLUMN),
        batch.column_index(DATE_COLUMN),
    ) else {
        return 0;
    };

    let before = batch.len();
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(before);
    batch
        .rows
        .retain(|row| seen.insert((key_part(&row[symbol_idx]), key_part(&row[date_idx]))));
    before - batch.len()
}

// Tagged so that e.g. Integer(1) and Text("1") never collide.
fn key_part(value: &Value) -> String {
    match value {
        Value::Null => "n:".to_string(),
        Value::Integer(i) => format!("i:{i}"),
        Value::Real(r) => format!("r:{r}"),
        Value::Text(s) => format!("t:{s}"),
        Value::Timestamp(ts) => format!("d:{ts}"),
    }
}
