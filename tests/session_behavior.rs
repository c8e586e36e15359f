//! Behavior-driven tests for session lifecycle behavior
//!
//! These tests verify HOW the coordinator manages engine instances, caches,
//! and the upload gate, focusing on user-visible outcomes.

use std::sync::Arc;

use candleview_core::{
    LifecycleState, LoadError, MarketSession, QueryError, SessionConfig, UploadError,
};
use rusqlite::Connection;
use tempfile::{tempdir, NamedTempFile};

fn database_bytes(rows: &[(&str, i64, f64, f64)]) -> Vec<u8> {
    let staging = NamedTempFile::new().expect("tempfile");
    let connection = Connection::open(staging.path()).expect("open staging db");
    connection
        .execute_batch(
            "CREATE TABLE ohlcv (symbol TEXT, timestamp INTEGER, open REAL, high REAL, low REAL, close REAL, volume REAL)",
        )
        .expect("create table");
    for (symbol, timestamp, close, volume) in rows {
        connection
            .execute(
                "INSERT INTO ohlcv VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![symbol, timestamp, 10.0, 12.0, 9.0, close, volume],
            )
            .expect("insert row");
    }
    drop(connection);
    std::fs::read(staging.path()).expect("read staged db")
}

const DAY_MS: i64 = 86_400_000;
const BASE_MS: i64 = 1_577_836_800_000; // 2020-01-01T00:00:00Z

#[tokio::test]
async fn when_user_loads_valid_database_session_becomes_ready() {
    // Given: A fresh session
    let session = MarketSession::default();
    assert_eq!(session.state(), LifecycleState::Empty);

    // When: A valid database loads
    session
        .load(database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .await
        .expect("load should succeed");

    // Then: The session is ready and queryable
    assert_eq!(session.state(), LifecycleState::Ready);
    assert!(session.last_error().is_none());
    assert_eq!(session.list_symbols().expect("symbols").len(), 1);
}

#[tokio::test]
async fn repeated_series_requests_are_served_from_cache() {
    let session = MarketSession::default();
    session
        .load(database_bytes(&[
            ("ACME", BASE_MS, 11.0, 100.0),
            ("ACME", BASE_MS + DAY_MS, 12.0, 200.0),
        ]))
        .await
        .expect("load");

    let first = session.series_for("ACME").expect("first fetch");
    let second = session.series_for("ACME").expect("second fetch");

    // The very same object comes back; no new query ran.
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn loading_a_second_database_invalidates_all_caches() {
    // Given: A session with cached series and statistics for ACME
    let session = MarketSession::default();
    session
        .load(database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .await
        .expect("first load");
    let stale_series = session.series_for("ACME").expect("series");
    let stale_stats = session.statistics_for("ACME").expect("stats");
    assert_eq!(stale_series[0].close, 11.0);
    assert_eq!(stale_stats.total_volume, 100.0);

    // When: A second database with different ACME data loads
    session
        .load(database_bytes(&[("ACME", BASE_MS, 99.0, 500.0)]))
        .await
        .expect("second load");

    // Then: Queries reflect the new database, never the old cache
    let fresh_series = session.series_for("ACME").expect("series");
    let fresh_stats = session.statistics_for("ACME").expect("stats");
    assert_eq!(fresh_series[0].close, 99.0);
    assert_eq!(fresh_stats.total_volume, 500.0);
    assert!(!Arc::ptr_eq(&stale_series, &fresh_series));
}

#[tokio::test]
async fn close_releases_the_engine_and_gates_queries() {
    let session = MarketSession::default();
    session
        .load(database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .await
        .expect("load");
    session.series_for("ACME").expect("series");

    session.close();

    assert_eq!(session.state(), LifecycleState::Empty);
    let error = session.series_for("ACME").expect_err("must be gated");
    assert!(matches!(error, QueryError::NotReady));
}

#[tokio::test]
async fn default_database_loads_through_the_same_pipeline() {
    // Given: A bundled default database under a scratch home
    let home = tempdir().expect("tempdir");
    let default_database = home.path().join("market_data.db");
    std::fs::write(
        &default_database,
        database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]),
    )
    .expect("stage default database");

    let session = MarketSession::new(SessionConfig {
        home: home.path().to_path_buf(),
        default_database,
        ..SessionConfig::default()
    });

    // When: The startup load runs
    session.load_default().await.expect("default load");

    // Then: The session is ready, exactly as for an upload
    assert_eq!(session.state(), LifecycleState::Ready);
    assert_eq!(session.list_symbols().expect("symbols")[0].id, "ACME");
}

#[tokio::test]
async fn unsupported_extension_is_rejected_without_touching_state() {
    let session = MarketSession::default();
    session
        .load(database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .await
        .expect("load");

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("data.csv");
    std::fs::write(&path, b"symbol,close\n").expect("write file");

    let error = session.load_file(&path).await.expect_err("must fail");
    assert!(matches!(
        error,
        LoadError::Upload(UploadError::UnsupportedExtension { .. })
    ));
    // The gate runs before the load pipeline; prior state is intact.
    assert_eq!(session.state(), LifecycleState::Ready);
    assert_eq!(session.list_symbols().expect("symbols").len(), 1);
}

#[tokio::test]
async fn oversized_file_is_rejected_before_reading() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("big.db");
    std::fs::write(&path, database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .expect("write file");

    let session = MarketSession::new(SessionConfig {
        max_upload_bytes: 128,
        ..SessionConfig::default()
    });

    let error = session.load_file(&path).await.expect_err("must fail");
    assert!(matches!(
        error,
        LoadError::Upload(UploadError::Oversized { max: 128, .. })
    ));
    assert_eq!(session.state(), LifecycleState::Empty);
}

#[tokio::test]
async fn failed_reload_never_leaves_stale_data_queryable() {
    // Given: A ready session with cached data
    let session = MarketSession::default();
    session
        .load(database_bytes(&[("ACME", BASE_MS, 11.0, 100.0)]))
        .await
        .expect("load");
    session.series_for("ACME").expect("series");

    // When: A reload with corrupt bytes fails
    let error = session
        .load(b"garbage that is not sqlite".to_vec())
        .await
        .expect_err("must fail");
    assert!(matches!(error, LoadError::Engine(_)));

    // Then: The session is in Error with the reason, and the old engine and
    // caches are gone rather than silently serving stale data.
    assert_eq!(session.state(), LifecycleState::Error);
    assert!(session.last_error().is_some());
    let gated = session.series_for("ACME").expect_err("must be gated");
    assert!(matches!(gated, QueryError::NotReady));
}
