use crate::db::{quote_ident, Destination};
use crate::error::LoadError;
use crate::types::RecordBatch;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, info};

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: String,
    pub rows_written: usize,
}

/// Appends `batch` to `table` at `database_uri`, creating the table if needed.
///
/// The whole append runs in one transaction: either every row lands or none does.
pub fn load(
    batch: RecordBatch,
    database_uri: &str,
    table: &str,
) -> Result<LoadSummary, LoadError> {
    let result = Destination::parse(database_uri)
        .and_then(|dest| dest.open())
        .and_then(|mut conn| load_into(&mut conn, &batch, table));

    match &result {
        Ok(summary) => info!(
            "Loaded {} rows into '{}' table.",
            summary.rows_written, summary.table
        ),
        Err(e) => error!("Load failed: {}", e),
    }
    result
}

/// Appends `batch` through an open connection. Used by [`load`] and by callers
/// that manage their own connection.
pub fn load_into(
    conn: &mut Connection,
    batch: &RecordBatch,
    table: &str,
) -> Result<LoadSummary, LoadError> {
    if table.trim().is_empty() {
        return Err(LoadError::InvalidTableName(table.to_string()));
    }
    let table_ident = quote_ident(table);

    let tx = conn.transaction()?;

    let column_defs: Vec<String> = batch
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect();
    let create_sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table_ident,
        column_defs.join(", ")
    );
    debug!("{}", create_sql);
    tx.execute_batch(&create_sql)?;

    let rows_written = if batch.is_empty() {
        0
    } else {
        let column_list: Vec<String> = batch.column_names().map(quote_ident).collect();
        let placeholders: Vec<String> = (1..=batch.columns.len()).map(|i| format!("?{i}")).collect();
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_ident,
            column_list.join(", "),
            placeholders.join(", ")
        );
        debug!("{}", insert_sql);

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in &batch.rows {
                written += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        written
    };

    tx.commit()?;

    Ok(LoadSummary {
        table: table.to_string(),
        rows_written,
    })
}
