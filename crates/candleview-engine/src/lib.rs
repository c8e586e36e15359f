//! # candleview-engine
//!
//! Embedded SQLite engine adapter for candleview.
//!
//! This crate owns the live database instance behind a viewer session. A
//! database arrives as an opaque byte blob (an uploaded file or the bundled
//! default database); [`EngineHandle::load`] binds those bytes to a read-only
//! SQLite connection, [`EngineHandle::execute`] runs SQL and returns rows as
//! JSON values, and [`EngineHandle::close`] releases the engine.
//!
//! At most one handle is meant to be live at a time; the lifecycle
//! coordinator in `candleview-core` enforces that by closing any prior handle
//! before opening a new one.
//!
//! ## Security
//!
//! `execute` takes bound parameters (`&[&dyn ToSql]`). Caller-provided values
//! such as symbols must always be passed as parameters, never interpolated
//! into query text.

use std::io::Write;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use serde_json::{Number, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

// Bound-parameter trait used by `EngineHandle::execute`; re-exported so
// downstream crates don't need a direct rusqlite dependency.
pub use rusqlite::ToSql;

/// First bytes of every well-formed SQLite database file.
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Errors raised by the engine adapter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input byte sequence had zero length.
    #[error("database input is empty")]
    EmptyInput,

    /// The bytes could not be parsed as a SQLite database.
    #[error("not a valid SQLite database: {0}")]
    CorruptFile(String),

    /// The handle was closed before this call.
    #[error("engine is closed")]
    Closed,

    /// Malformed SQL or an execution fault. Zero matched rows is a valid
    /// empty result, never this error.
    #[error("query failed: {0}")]
    Query(String),

    /// Filesystem failure while staging the database blob.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tabular result of a query: column names plus rows of JSON values.
#[derive(Debug, Clone, Serialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Exclusive handle to a live in-memory SQLite engine.
///
/// The loaded blob is staged into a temp file owned by the handle, so the
/// engine's backing storage lives exactly as long as the handle itself.
pub struct EngineHandle {
    connection: Option<Connection>,
    backing: NamedTempFile,
}

impl EngineHandle {
    /// Construct an engine from a database blob.
    ///
    /// # Errors
    /// - [`EngineError::EmptyInput`] if `bytes` is empty
    /// - [`EngineError::CorruptFile`] if the bytes are not a SQLite database
    pub fn load(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        if bytes.len() < SQLITE_MAGIC.len() || &bytes[..SQLITE_MAGIC.len()] != SQLITE_MAGIC {
            return Err(EngineError::CorruptFile(String::from(
                "missing SQLite file header",
            )));
        }

        let mut backing = NamedTempFile::new()?;
        backing.write_all(bytes)?;
        backing.flush()?;

        let connection = Connection::open_with_flags(
            backing.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|error| EngineError::CorruptFile(error.to_string()))?;

        // The open above is lazy; probe the catalog so truncated or damaged
        // files fail here instead of on the first domain query.
        connection
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|error| EngineError::CorruptFile(error.to_string()))?;

        Ok(Self {
            connection: Some(connection),
            backing,
        })
    }

    /// Execute SQL with bound parameters, collecting all rows.
    ///
    /// # Errors
    /// [`EngineError::Closed`] after [`close`](Self::close);
    /// [`EngineError::Query`] on malformed SQL or an execution fault.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<QueryTable, EngineError> {
        let connection = self.connection.as_ref().ok_or(EngineError::Closed)?;

        let mut statement = connection.prepare(sql).map_err(query_error)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let column_count = columns.len();

        let mut cursor = statement.query(params).map_err(query_error)?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next().map_err(query_error)? {
            let mut output = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value: SqlValue = row.get(index).map_err(query_error)?;
                output.push(to_json_value(value));
            }
            rows.push(output);
        }

        Ok(QueryTable { columns, rows })
    }

    /// Whether the handle still owns a live connection.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Release the engine's resources. Idempotent; subsequent `execute`
    /// calls fail with [`EngineError::Closed`].
    pub fn close(&mut self) -> Result<(), EngineError> {
        match self.connection.take() {
            Some(connection) => connection
                .close()
                .map_err(|(_, error)| EngineError::Query(error.to_string())),
            None => Ok(()),
        }
    }

    /// Path of the temp file staging the loaded blob.
    pub fn backing_path(&self) -> &std::path::Path {
        self.backing.path()
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("open", &self.is_open())
            .field("backing", &self.backing.path())
            .finish()
    }
}

fn query_error(error: rusqlite::Error) -> EngineError {
    EngineError::Query(error.to_string())
}

/// Convert a SQLite value to a JSON value, preserving the storage class so
/// callers can tell numeric timestamps from textual ones.
fn to_json_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => Value::Number(Number::from(value)),
        SqlValue::Real(value) => number_from_f64(value),
        SqlValue::Text(value) => Value::String(value),
        SqlValue::Blob(value) => Value::String(hex::encode(value)),
    }
}

/// Convert an f64 to a JSON number, returning Null for NaN/Inf.
fn number_from_f64(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
