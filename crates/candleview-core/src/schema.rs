//! Shape validation for a freshly loaded database.
//!
//! Checks run in order and short-circuit on the first failure. Validation
//! never mutates the handle; on failure the handle is left open for the
//! caller to close.

use candleview_engine::{EngineError, EngineHandle, QueryTable, ToSql};

use crate::domain::normalize_value;
use crate::error::SchemaError;

/// Table every viewer database must provide.
pub const REQUIRED_TABLE: &str = "ohlcv";

/// Minimum column set of the `ohlcv` table; extra columns are tolerated.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "symbol",
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
];

/// Validate that the loaded database satisfies the required shape.
pub fn validate(engine: &EngineHandle) -> Result<(), SchemaError> {
    check_table_exists(engine)?;
    check_required_columns(engine)?;
    check_has_symbols(engine)?;
    check_sample_timestamp(engine)?;
    Ok(())
}

fn check_table_exists(engine: &EngineHandle) -> Result<(), SchemaError> {
    let table = run(
        engine,
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
        &[&REQUIRED_TABLE],
    )?;

    if table.is_empty() {
        return Err(SchemaError::MissingTable {
            table: REQUIRED_TABLE.to_owned(),
        });
    }
    Ok(())
}

fn check_required_columns(engine: &EngineHandle) -> Result<(), SchemaError> {
    // PRAGMA table_info takes no bound parameters; the table name here is a
    // compile-time constant, never caller input.
    let info = run(engine, "PRAGMA table_info(ohlcv)", &[])?;
    let name_index = info.column_index("name").unwrap_or(1);

    let present: Vec<String> = info
        .rows
        .iter()
        .filter_map(|row| row.get(name_index))
        .filter_map(|value| value.as_str().map(str::to_owned))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !present.iter().any(|column| column == *required))
        .map(|required| (*required).to_owned())
        .collect();

    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { columns: missing });
    }
    Ok(())
}

fn check_has_symbols(engine: &EngineHandle) -> Result<(), SchemaError> {
    let count = run(engine, "SELECT COUNT(DISTINCT symbol) FROM ohlcv", &[])?;
    let symbols = count
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);

    if symbols == 0 {
        return Err(SchemaError::EmptyDataset);
    }
    Ok(())
}

fn check_sample_timestamp(engine: &EngineHandle) -> Result<(), SchemaError> {
    let sample = run(engine, "SELECT timestamp FROM ohlcv LIMIT 1", &[])?;
    let Some(cell) = sample.rows.first().and_then(|row| row.first()) else {
        // Row count was checked above; an empty sample here means the table
        // changed underneath us, which read-only handles rule out.
        return Err(SchemaError::EmptyDataset);
    };

    normalize_value(cell).map_err(|_| SchemaError::UnparseableTimestamp {
        value: display_cell(cell),
    })?;
    Ok(())
}

fn run(
    engine: &EngineHandle,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<QueryTable, SchemaError> {
    engine
        .execute(sql, params)
        .map_err(|error: EngineError| SchemaError::Inspection(error.to_string()))
}

fn display_cell(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
