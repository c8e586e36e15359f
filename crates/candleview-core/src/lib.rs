//! # candleview-core
//!
//! Query, cache, validation, and lifecycle core for the candleview OHLCV
//! viewer. The core sits between the embedded SQLite engine
//! (`candleview-engine`) and whatever renders the data, and owns everything
//! with algorithmic content:
//!
//! - **Schema validation** of a loaded database (table, columns, content,
//!   timestamp encoding), short-circuiting with a distinct reason per check
//! - **Query service** for the three domain queries (symbol list, OHLCV
//!   series, aggregate statistics) with bound parameters throughout
//! - **Timestamp normalization** accepting both observed encodings (numeric
//!   epoch-milliseconds and textual date-times), detected per row
//! - **Result cache** memoizing per-symbol series and statistics for the
//!   lifetime of one engine instance
//! - **Lifecycle coordinator** serializing loads, gating queries on a ready
//!   engine, and guaranteeing at most one live engine at a time
//! - **Upload gate** (extension whitelist, size cap) and the persisted
//!   **watchlist** store
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Per-symbol result memoization |
//! | [`domain`] | Domain models and timestamp normalization |
//! | [`error`] | Core error taxonomy |
//! | [`query`] | The three parameterized domain queries |
//! | [`schema`] | Database shape validation |
//! | [`session`] | Lifecycle coordinator and consumer interface |
//! | [`upload`] | Pre-parse upload checks |
//! | [`watchlist`] | Persisted ordered watchlist |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use candleview_core::{MarketSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = MarketSession::new(SessionConfig::default());
//!     let bytes = std::fs::read("market_data.db")?;
//!     session.load(bytes).await?;
//!
//!     for asset in session.list_symbols()? {
//!         let stats = session.statistics_for(&asset.id)?;
//!         println!("{}: {:+.2}%", asset.id, stats.price_change_percent);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod domain;
pub mod error;
pub mod query;
pub mod schema;
pub mod session;
pub mod upload;
pub mod watchlist;

// Re-export commonly used types at crate root for convenience

// Domain models
pub use domain::{normalize_value, AssetIdentity, OhlcvRecord, RawTimestamp, StatisticsSummary, UtcDateTime};

// Error types
pub use error::{LoadError, QueryError, RowError, SchemaError, TimestampError};

// Lifecycle coordinator
pub use session::{LifecycleState, MarketSession, SessionConfig};

// Upload gate
pub use upload::{UploadError, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES};

// Watchlist
pub use watchlist::{Watchlist, WatchlistError, WatchlistStore};

// Engine (re-exported from candleview-engine)
pub use candleview_engine::{EngineError, EngineHandle, QueryTable};
