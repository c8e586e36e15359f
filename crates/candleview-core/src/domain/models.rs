use serde::{Deserialize, Serialize};

use crate::error::RowError;
use crate::UtcDateTime;

/// Asset as presented to list and watchlist consumers.
///
/// Derived 1:1 from distinct `symbol` values; the source schema has no
/// separate human-readable label, so `id` and `name` are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIdentity {
    pub id: String,
    pub name: String,
}

impl AssetIdentity {
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        let id = symbol.into();
        Self {
            name: id.clone(),
            id,
        }
    }
}

/// One normalized OHLCV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRecord {
    pub symbol: String,
    pub timestamp: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvRecord {
    /// Build a record, rejecting non-finite numeric fields. Rows failing this
    /// are a data error, not something to coerce silently.
    pub fn new(
        symbol: impl Into<String>,
        timestamp: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, RowError> {
        validate_finite("open", open)?;
        validate_finite("high", high)?;
        validate_finite("low", low)?;
        validate_finite("close", close)?;
        validate_finite("volume", volume)?;

        Ok(Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Per-symbol aggregate over the full OHLCV series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub price_change: f64,
    pub price_change_percent: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    pub average_volume: f64,
    pub total_volume: f64,
    pub data_points: u64,
    pub first_date: UtcDateTime,
    pub last_date: UtcDateTime,
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), RowError> {
    if !value.is_finite() {
        return Err(RowError::NonFinite { field });
    }
    Ok(())
}
