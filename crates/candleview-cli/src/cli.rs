//! CLI argument definitions for candleview.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `symbols` | List distinct symbols in the loaded database |
//! | `series` | Fetch the OHLCV series for a symbol |
//! | `stats` | Aggregate statistics for a symbol |
//! | `validate` | Load a database and report whether it passes validation |
//! | `watchlist` | Manage the persisted watchlist |
//!
//! # Global options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--db` | bundled default | Path to the SQLite database file |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// candleview - OHLCV SQLite viewer core
///
/// Load a SQLite market-data file, inspect its symbols, and fetch candle
/// series and summary statistics. Without `--db`, the bundled default
/// database under the candleview home is used.
#[derive(Debug, Parser)]
#[command(name = "candleview", author, version, about = "OHLCV SQLite viewer core")]
pub struct Cli {
    /// Path to the SQLite database file (.db, .sqlite, .sqlite3).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// ASCII table format for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List distinct symbols, lexicographically ascending.
    Symbols,
    /// Fetch the most recent OHLCV rows for a symbol, oldest first.
    Series(SeriesArgs),
    /// Aggregate statistics over a symbol's full series.
    Stats(StatsArgs),
    /// Load the database and report the validation outcome.
    Validate,
    /// Manage the persisted watchlist.
    Watchlist(WatchlistArgs),
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Symbol to fetch.
    pub symbol: String,

    /// Maximum number of points (most recent), presented oldest first.
    #[arg(long, default_value_t = 500)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Symbol to summarize.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct WatchlistArgs {
    #[command(subcommand)]
    pub action: WatchlistAction,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistAction {
    /// Add a symbol (validated against the loaded database).
    Add { symbol: String },
    /// Remove a symbol.
    Remove { symbol: String },
    /// Show the watchlist in insertion order.
    List,
}
