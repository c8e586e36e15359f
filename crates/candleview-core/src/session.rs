//! Lifecycle coordinator: the single owner of the live engine instance.
//!
//! States run `Empty -> Loading -> {Ready, Error}`; a new load from `Ready`
//! or `Error` passes back through `Loading`, and an explicit close returns to
//! `Empty`. Only one load may be in flight at a time; a load arriving while
//! `Loading` is rejected, deterministically. Entering `Loading` releases the
//! prior engine and clears both caches before the new attempt, so a failed
//! reload never leaves stale data queryable.
//!
//! A generation counter makes load settlement last-wins: if the session moved
//! on (close during an in-flight load), the late result is discarded and its
//! engine closed instead of being installed.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use candleview_engine::{EngineError, EngineHandle};

use crate::cache::ResultCache;
use crate::domain::{AssetIdentity, OhlcvRecord, StatisticsSummary};
use crate::error::{LoadError, QueryError};
use crate::{query, schema, upload};

/// Coordinator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Root directory for candleview data.
    pub home: PathBuf,
    /// Bundled default database, loaded through the same pipeline as uploads.
    pub default_database: PathBuf,
    /// Upload size cap, enforced before any parsing attempt.
    pub max_upload_bytes: u64,
    /// Cap on fetched series length (most recent points).
    pub series_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let home = resolve_candleview_home();
        let default_database = home.join("market_data.db");
        Self {
            home,
            default_database,
            max_upload_bytes: upload::MAX_UPLOAD_BYTES,
            series_limit: query::DEFAULT_SERIES_LIMIT,
        }
    }
}

struct SessionInner {
    state: LifecycleState,
    engine: Option<EngineHandle>,
    cache: ResultCache,
    last_error: Option<String>,
    generation: u64,
}

/// The consumer-facing core: load/close plus the three gated queries.
pub struct MarketSession {
    config: SessionConfig,
    inner: Mutex<SessionInner>,
}

impl Default for MarketSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl MarketSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(SessionInner {
                state: LifecycleState::Empty,
                engine: None,
                cache: ResultCache::new(),
                last_error: None,
                generation: 0,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// Last load/validation failure, kept for display until the next load.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Load a database from raw bytes: engine construction plus schema
    /// validation off the caller's thread, then installation.
    pub async fn load(&self, bytes: Vec<u8>) -> Result<(), LoadError> {
        // Zero-byte input is rejected before any state transition or engine
        // initialization; the prior state stays intact.
        if bytes.is_empty() {
            return Err(LoadError::Engine(EngineError::EmptyInput));
        }

        let generation = self.begin_load()?;
        let outcome = tokio::task::spawn_blocking(move || open_and_validate(&bytes))
            .await
            .unwrap_or_else(|join| {
                Err(LoadError::Engine(EngineError::Query(format!(
                    "load task failed: {join}"
                ))))
            });
        self.finish_load(generation, outcome)
    }

    /// Load an uploaded file: extension whitelist and size cap first, then
    /// the byte pipeline. Gate failures never disturb the current state.
    pub async fn load_file(&self, path: &Path) -> Result<(), LoadError> {
        let bytes = upload::read_database_file(path, self.config.max_upload_bytes)?;
        self.load(bytes).await
    }

    /// Load the bundled default database from its well-known path.
    pub async fn load_default(&self) -> Result<(), LoadError> {
        let path = self.config.default_database.clone();
        self.load_file(&path).await
    }

    /// Release the engine and return to `Empty`. Any in-flight load is
    /// superseded and will discard its result.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.cache.invalidate_all();
        if let Some(mut engine) = inner.engine.take() {
            let _ = engine.close();
        }
        inner.generation += 1;
        inner.state = LifecycleState::Empty;
        inner.last_error = None;
    }

    /// Distinct symbols, ascending. Gated on `Ready`.
    pub fn list_symbols(&self) -> Result<Vec<AssetIdentity>, QueryError> {
        let inner = self.lock();
        let engine = ready_engine(&inner)?;
        query::list_symbols(engine)
    }

    /// Series for one symbol, served from cache after the first fetch.
    pub fn series_for(&self, symbol: &str) -> Result<Arc<Vec<OhlcvRecord>>, QueryError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(hit) = inner.cache.series(symbol) {
            return Ok(hit);
        }

        let engine = ready_engine(inner)?;
        let series = Arc::new(query::series_for(engine, symbol, self.config.series_limit)?);
        inner.cache.put_series(symbol.to_owned(), Arc::clone(&series));
        Ok(series)
    }

    /// Statistics for one symbol, served from cache after the first fetch.
    pub fn statistics_for(&self, symbol: &str) -> Result<StatisticsSummary, QueryError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(hit) = inner.cache.statistics(symbol) {
            return Ok(hit);
        }

        let engine = ready_engine(inner)?;
        let statistics = query::statistics_for(engine, symbol)?;
        inner
            .cache
            .put_statistics(symbol.to_owned(), statistics.clone());
        Ok(statistics)
    }

    /// Enter `Loading`: reject if a load is already in flight, otherwise
    /// release the prior engine and caches and claim a new generation.
    fn begin_load(&self) -> Result<u64, LoadError> {
        let mut inner = self.lock();
        if inner.state == LifecycleState::Loading {
            return Err(LoadError::InProgress);
        }

        inner.cache.invalidate_all();
        if let Some(mut engine) = inner.engine.take() {
            let _ = engine.close();
        }
        inner.state = LifecycleState::Loading;
        inner.last_error = None;
        inner.generation += 1;
        Ok(inner.generation)
    }

    /// Settle a load. A stale generation means the session was superseded;
    /// the late engine is closed and never installed.
    fn finish_load(
        &self,
        generation: u64,
        outcome: Result<EngineHandle, LoadError>,
    ) -> Result<(), LoadError> {
        let mut inner = self.lock();
        if inner.generation != generation {
            if let Ok(mut engine) = outcome {
                let _ = engine.close();
            }
            return Err(LoadError::Superseded);
        }

        match outcome {
            Ok(engine) => {
                inner.engine = Some(engine);
                inner.state = LifecycleState::Ready;
                inner.last_error = None;
                Ok(())
            }
            Err(error) => {
                inner.state = LifecycleState::Error;
                inner.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session mutex poisoned")
    }
}

fn ready_engine(inner: &SessionInner) -> Result<&EngineHandle, QueryError> {
    if inner.state != LifecycleState::Ready {
        return Err(QueryError::NotReady);
    }
    inner.engine.as_ref().ok_or(QueryError::NotReady)
}

fn open_and_validate(bytes: &[u8]) -> Result<EngineHandle, LoadError> {
    let mut engine = EngineHandle::load(bytes)?;
    if let Err(error) = schema::validate(&engine) {
        // Validation leaves the handle open; the load pipeline owns it here.
        let _ = engine.close();
        return Err(LoadError::Validation(error));
    }
    Ok(engine)
}

/// Resolve the candleview home directory from environment or default.
pub fn resolve_candleview_home() -> PathBuf {
    if let Some(path) = env::var_os("CANDLEVIEW_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".candleview");
    }

    PathBuf::from(".candleview")
}
