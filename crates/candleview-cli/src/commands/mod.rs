mod series;
mod stats;
mod symbols;
mod validate;
mod watchlist;

use candleview_core::{MarketSession, SessionConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    match &cli.command {
        Command::Symbols => {
            let session = load_session(cli, None).await?;
            symbols::run(&session)
        }
        Command::Series(args) => {
            let session = load_session(cli, Some(args.limit)).await?;
            series::run(&session, args)
        }
        Command::Stats(args) => {
            let session = load_session(cli, None).await?;
            stats::run(&session, args)
        }
        Command::Validate => validate::run(cli).await,
        Command::Watchlist(args) => watchlist::run(cli, args).await,
    }
}

/// Build a session and run the load/validate pipeline against either the
/// `--db` path or the bundled default database.
pub(crate) async fn load_session(
    cli: &Cli,
    series_limit: Option<usize>,
) -> Result<MarketSession, CliError> {
    let mut config = SessionConfig::default();
    if let Some(limit) = series_limit {
        config.series_limit = limit;
    }

    let session = MarketSession::new(config);
    match &cli.db {
        Some(path) => session.load_file(path).await?,
        None => session.load_default().await?,
    }
    Ok(session)
}
