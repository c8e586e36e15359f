//! Behavior-driven tests for error handling and security behavior
//!
//! These tests verify HOW the system rejects malformed databases with
//! distinct reasons and stays safe against hostile symbol values.

use candleview_core::{
    EngineError, LifecycleState, LoadError, MarketSession, SchemaError,
};
use rusqlite::Connection;
use tempfile::NamedTempFile;

fn database_from_sql(sql: &str) -> Vec<u8> {
    let staging = NamedTempFile::new().expect("tempfile");
    let connection = Connection::open(staging.path()).expect("open staging db");
    connection.execute_batch(sql).expect("seed database");
    drop(connection);
    std::fs::read(staging.path()).expect("read staged db")
}

// =============================================================================
// Validation: distinct, human-readable rejection reasons
// =============================================================================

#[tokio::test]
async fn missing_table_is_rejected_naming_the_table() {
    let bytes = database_from_sql(
        "CREATE TABLE prices (symbol TEXT, timestamp INTEGER, close REAL);
         INSERT INTO prices VALUES ('ACME', 1577836800000, 11.0);",
    );

    let session = MarketSession::default();
    let error = session.load(bytes).await.expect_err("must reject");
    match error {
        LoadError::Validation(SchemaError::MissingTable { table }) => {
            assert_eq!(table, "ohlcv");
        }
        other => panic!("expected MissingTable, got {other:?}"),
    }
    assert_eq!(session.state(), LifecycleState::Error);
    assert!(session.last_error().expect("reason kept").contains("ohlcv"));
}

#[tokio::test]
async fn missing_volume_column_is_named_exactly() {
    let bytes = database_from_sql(
        "CREATE TABLE ohlcv (symbol TEXT, timestamp INTEGER, open REAL, high REAL, low REAL, close REAL);
         INSERT INTO ohlcv VALUES ('ACME', 1577836800000, 10.0, 12.0, 9.0, 11.0);",
    );

    let session = MarketSession::default();
    let error = session.load(bytes).await.expect_err("must reject");
    match error {
        LoadError::Validation(SchemaError::MissingColumns { columns }) => {
            assert_eq!(columns, vec!["volume".to_owned()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    assert!(session.last_error().expect("reason kept").contains("volume"));
}

#[tokio::test]
async fn extra_columns_are_tolerated() {
    let bytes = database_from_sql(
        "CREATE TABLE ohlcv (symbol TEXT, index_id INTEGER, timestamp INTEGER, open REAL, high REAL, low REAL, close REAL, volume REAL, note TEXT);
         INSERT INTO ohlcv VALUES ('ACME', 1, 1577836800000, 10.0, 12.0, 9.0, 11.0, 100.0, 'extra');",
    );

    let session = MarketSession::default();
    session.load(bytes).await.expect("extra columns are fine");
    assert_eq!(session.state(), LifecycleState::Ready);
}

#[tokio::test]
async fn empty_dataset_is_rejected() {
    let bytes = database_from_sql(
        "CREATE TABLE ohlcv (symbol TEXT, timestamp INTEGER, open REAL, high REAL, low REAL, close REAL, volume REAL);",
    );

    let session = MarketSession::default();
    let error = session.load(bytes).await.expect_err("must reject");
    assert!(matches!(
        error,
        LoadError::Validation(SchemaError::EmptyDataset)
    ));
}

#[tokio::test]
async fn unparseable_sample_timestamp_is_rejected() {
    let bytes = database_from_sql(
        "CREATE TABLE ohlcv (symbol TEXT, timestamp TEXT, open REAL, high REAL, low REAL, close REAL, volume REAL);
         INSERT INTO ohlcv VALUES ('ACME', 'whenever', 10.0, 12.0, 9.0, 11.0, 100.0);",
    );

    let session = MarketSession::default();
    let error = session.load(bytes).await.expect_err("must reject");
    match error {
        LoadError::Validation(SchemaError::UnparseableTimestamp { value }) => {
            assert_eq!(value, "whenever");
        }
        other => panic!("expected UnparseableTimestamp, got {other:?}"),
    }
}

// =============================================================================
// Upload-time rejections
// =============================================================================

#[tokio::test]
async fn zero_byte_upload_is_rejected_before_engine_initialization() {
    let session = MarketSession::default();
    let error = session.load(Vec::new()).await.expect_err("must reject");
    assert!(matches!(error, LoadError::Engine(EngineError::EmptyInput)));
    // No engine was constructed; the session never left Empty.
    assert_eq!(session.state(), LifecycleState::Empty);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn corrupt_bytes_are_rejected_as_invalid_sqlite() {
    let session = MarketSession::default();
    let error = session
        .load(b"SQLite format 3\0 followed by nonsense".to_vec())
        .await
        .expect_err("must reject");
    assert!(matches!(error, LoadError::Engine(EngineError::CorruptFile(_))));
    assert_eq!(session.state(), LifecycleState::Error);
}

// =============================================================================
// Security: hostile symbol values
// =============================================================================

#[tokio::test]
async fn hostile_symbol_values_cannot_inject_sql() {
    // Given: A database whose symbol column contains an injection attempt
    let dangerous_symbol = r#"ACME'; DROP TABLE ohlcv; --"#;
    let staging = NamedTempFile::new().expect("tempfile");
    {
        let connection = Connection::open(staging.path()).expect("open staging db");
        connection
            .execute_batch(
                "CREATE TABLE ohlcv (symbol TEXT, timestamp INTEGER, open REAL, high REAL, low REAL, close REAL, volume REAL)",
            )
            .expect("create table");
        connection
            .execute(
                "INSERT INTO ohlcv VALUES (?1, 1577836800000, 10.0, 12.0, 9.0, 11.0, 100.0)",
                rusqlite::params![dangerous_symbol],
            )
            .expect("insert hostile row");
        connection
            .execute(
                "INSERT INTO ohlcv VALUES ('PLAIN', 1577923200000, 11.0, 13.0, 10.0, 12.0, 200.0)",
                [],
            )
            .expect("insert plain row");
    }
    let bytes = std::fs::read(staging.path()).expect("read staged db");

    let session = MarketSession::default();
    session.load(bytes).await.expect("load");

    // When: The hostile symbol is queried (bound parameter, never spliced)
    let series = session.series_for(dangerous_symbol).expect("series");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].symbol, dangerous_symbol);

    let stats = session.statistics_for(dangerous_symbol).expect("stats");
    assert_eq!(stats.data_points, 1);

    // Then: The table survived and every symbol is still listed
    let symbols = session.list_symbols().expect("symbols");
    assert_eq!(symbols.len(), 2);
    assert!(symbols.iter().any(|asset| asset.id == dangerous_symbol));
    assert!(symbols.iter().any(|asset| asset.id == "PLAIN"));
}
