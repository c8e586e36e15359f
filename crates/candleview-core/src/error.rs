use thiserror::Error;

use candleview_engine::EngineError;

use crate::upload::UploadError;

/// A stored timestamp that fits neither recognized encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp '{value}' is neither epoch milliseconds nor a recognized date-time")]
    Unparseable { value: String },
}

/// Reasons a loaded database fails shape validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required table '{table}'")]
    MissingTable { table: String },

    #[error("table 'ohlcv' is missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("table 'ohlcv' is empty; the database must contain at least one symbol")]
    EmptyDataset,

    #[error("sampled timestamp '{value}' is not a recognized encoding")]
    UnparseableTimestamp { value: String },

    #[error("schema inspection failed: {0}")]
    Inspection(String),
}

/// A single result row that cannot be normalized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing column '{column}' in result row")]
    MissingColumn { column: &'static str },

    #[error("field '{field}' is not numeric")]
    NotNumeric { field: &'static str },

    #[error("field '{field}' must be finite")]
    NonFinite { field: &'static str },

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Errors returned to query callers. `NoData` is a normal empty-result
/// signal, distinct from execution faults, and is never logged as a failure.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no database loaded")]
    NotReady,

    #[error("no data available for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("malformed row at index {index}: {source}")]
    MalformedRow {
        index: usize,
        #[source]
        source: RowError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl QueryError {
    /// Whether this is the empty-result signal rather than a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Errors from a load attempt. Upload and validation failures abort the load;
/// `InProgress` and `Superseded` are lifecycle outcomes, not data faults.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("a database load is already in progress")]
    InProgress,

    #[error("load superseded; the session moved on before this load settled")]
    Superseded,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Validation(#[from] SchemaError),
}
