//! The three domain queries, parameterized end to end.
//!
//! Symbol values always travel as bound parameters; caller input is never
//! spliced into query text. Only constant table and column names appear as
//! literals.

use candleview_engine::{EngineHandle, QueryTable, ToSql};
use serde_json::Value;

use crate::domain::{normalize_value, AssetIdentity, OhlcvRecord, StatisticsSummary};
use crate::error::{QueryError, RowError};

/// Default cap for a fetched series: the most recent 500 points.
pub const DEFAULT_SERIES_LIMIT: usize = 500;

const SYMBOLS_SQL: &str = "SELECT DISTINCT symbol FROM ohlcv ORDER BY symbol ASC";

// Fetch the window descending so LIMIT keeps the most recent points, then
// reverse into ascending presentation order.
const SERIES_SQL: &str = "SELECT timestamp, open, high, low, close, volume \
     FROM ohlcv WHERE symbol = ?1 ORDER BY timestamp DESC LIMIT ?2";

const STATISTICS_SQL: &str = "WITH asset_data AS ( \
         SELECT MIN(timestamp) AS first_timestamp, \
                MAX(timestamp) AS last_timestamp, \
                MIN(low) AS lowest_price, \
                MAX(high) AS highest_price, \
                AVG(volume) AS avg_volume, \
                SUM(volume) AS total_volume, \
                COUNT(*) AS data_points \
         FROM ohlcv WHERE symbol = ?1 \
     ) \
     SELECT first_timestamp, last_timestamp, lowest_price, highest_price, \
            avg_volume, total_volume, data_points, \
            (SELECT close FROM ohlcv WHERE symbol = ?1 ORDER BY timestamp ASC LIMIT 1) AS first_close, \
            (SELECT close FROM ohlcv WHERE symbol = ?1 ORDER BY timestamp DESC LIMIT 1) AS last_close \
     FROM asset_data";

/// Distinct symbols, lexicographically ascending.
pub fn list_symbols(engine: &EngineHandle) -> Result<Vec<AssetIdentity>, QueryError> {
    let table = engine.execute(SYMBOLS_SQL, &[])?;

    let mut assets = Vec::with_capacity(table.row_count());
    for row in &table.rows {
        if let Some(symbol) = row.first().and_then(symbol_string) {
            assets.push(AssetIdentity::from_symbol(symbol));
        }
    }
    Ok(assets)
}

/// The `limit` most recent rows for `symbol`, in ascending timestamp order.
///
/// A row with an unparseable timestamp or a non-finite numeric field aborts
/// the whole fetch with [`QueryError::MalformedRow`] naming its index in the
/// final ascending ordering; partial results are never returned.
pub fn series_for(
    engine: &EngineHandle,
    symbol: &str,
    limit: usize,
) -> Result<Vec<OhlcvRecord>, QueryError> {
    let limit = limit as i64;
    let mut table = engine.execute(SERIES_SQL, &[&symbol, &limit])?;

    if table.is_empty() {
        return Err(QueryError::NoData {
            symbol: symbol.to_owned(),
        });
    }

    table.rows.reverse();

    let layout = SeriesLayout::resolve(&table)?;
    let mut records = Vec::with_capacity(table.row_count());
    for (index, row) in table.rows.iter().enumerate() {
        let record = layout
            .normalize(symbol, row)
            .map_err(|source| QueryError::MalformedRow { index, source })?;
        records.push(record);
    }
    Ok(records)
}

/// Aggregate statistics over the full series for `symbol`.
pub fn statistics_for(
    engine: &EngineHandle,
    symbol: &str,
) -> Result<StatisticsSummary, QueryError> {
    let table = engine.execute(STATISTICS_SQL, &[&symbol])?;
    let Some(row) = table.rows.first() else {
        return Err(QueryError::NoData {
            symbol: symbol.to_owned(),
        });
    };

    let data_points = cell(&table, row, "data_points")?
        .as_i64()
        .unwrap_or_default();
    if data_points <= 0 {
        return Err(QueryError::NoData {
            symbol: symbol.to_owned(),
        });
    }

    let first_date = aggregate_timestamp(&table, row, "first_timestamp")?;
    let last_date = aggregate_timestamp(&table, row, "last_timestamp")?;
    let lowest_price = aggregate_number(&table, row, "lowest_price")?;
    let highest_price = aggregate_number(&table, row, "highest_price")?;
    let average_volume = aggregate_number(&table, row, "avg_volume")?;
    let total_volume = aggregate_number(&table, row, "total_volume")?;
    let first_close = aggregate_number(&table, row, "first_close")?;
    let last_close = aggregate_number(&table, row, "last_close")?;

    let price_change = last_close - first_close;
    // Policy: a zero first close yields 0%, not a division by zero.
    let price_change_percent = if first_close == 0.0 {
        0.0
    } else {
        price_change / first_close * 100.0
    };

    Ok(StatisticsSummary {
        price_change,
        price_change_percent,
        highest_price,
        lowest_price,
        average_volume,
        total_volume,
        data_points: data_points as u64,
        first_date,
        last_date,
    })
}

/// Column positions of a series result, resolved once per fetch.
struct SeriesLayout {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl SeriesLayout {
    fn resolve(table: &QueryTable) -> Result<Self, QueryError> {
        Ok(Self {
            timestamp: position(table, "timestamp")?,
            open: position(table, "open")?,
            high: position(table, "high")?,
            low: position(table, "low")?,
            close: position(table, "close")?,
            volume: position(table, "volume")?,
        })
    }

    fn normalize(&self, symbol: &str, row: &[Value]) -> Result<OhlcvRecord, RowError> {
        let timestamp = normalize_value(row.get(self.timestamp).unwrap_or(&Value::Null))?;
        OhlcvRecord::new(
            symbol,
            timestamp,
            numeric(row, self.open, "open")?,
            numeric(row, self.high, "high")?,
            numeric(row, self.low, "low")?,
            numeric(row, self.close, "close")?,
            numeric(row, self.volume, "volume")?,
        )
    }
}

fn position(table: &QueryTable, column: &'static str) -> Result<usize, QueryError> {
    table
        .column_index(column)
        .ok_or(QueryError::MalformedRow {
            index: 0,
            source: RowError::MissingColumn { column },
        })
}

fn cell<'a>(
    table: &QueryTable,
    row: &'a [Value],
    column: &'static str,
) -> Result<&'a Value, QueryError> {
    let index = position(table, column)?;
    Ok(row.get(index).unwrap_or(&Value::Null))
}

fn aggregate_number(
    table: &QueryTable,
    row: &[Value],
    column: &'static str,
) -> Result<f64, QueryError> {
    let value = cell(table, row, column)?;
    let parsed = value_to_f64(value, column)
        .map_err(|source| QueryError::MalformedRow { index: 0, source })?;
    if !parsed.is_finite() {
        return Err(QueryError::MalformedRow {
            index: 0,
            source: RowError::NonFinite { field: column },
        });
    }
    Ok(parsed)
}

fn aggregate_timestamp(
    table: &QueryTable,
    row: &[Value],
    column: &'static str,
) -> Result<crate::UtcDateTime, QueryError> {
    let value = cell(table, row, column)?;
    normalize_value(value).map_err(|error| QueryError::MalformedRow {
        index: 0,
        source: RowError::Timestamp(error),
    })
}

fn numeric(row: &[Value], index: usize, field: &'static str) -> Result<f64, RowError> {
    value_to_f64(row.get(index).unwrap_or(&Value::Null), field)
}

fn value_to_f64(value: &Value, field: &'static str) -> Result<f64, RowError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or(RowError::NotNumeric { field }),
        // Some exports store numerics as text; accept what parses cleanly.
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| RowError::NotNumeric { field }),
        _ => Err(RowError::NotNumeric { field }),
    }
}

fn symbol_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
