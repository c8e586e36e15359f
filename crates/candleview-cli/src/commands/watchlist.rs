use candleview_core::WatchlistStore;
use serde_json::{json, Value};

use crate::cli::{Cli, WatchlistAction, WatchlistArgs};
use crate::error::CliError;

pub async fn run(cli: &Cli, args: &WatchlistArgs) -> Result<Value, CliError> {
    let store = WatchlistStore::open_default();
    let mut watchlist = store.load()?;

    match &args.action {
        WatchlistAction::Add { symbol } => {
            // Additions are validated against the loaded database; only
            // symbols that actually exist can be watched.
            let session = super::load_session(cli, None).await?;
            let asset = session
                .list_symbols()?
                .into_iter()
                .find(|asset| asset.id == *symbol)
                .ok_or_else(|| {
                    CliError::Command(format!("symbol '{symbol}' is not present in the database"))
                })?;

            let added = watchlist.add(asset);
            if added {
                store.save(&watchlist)?;
            }
            Ok(json!({
                "action": "add",
                "symbol": symbol,
                "added": added,
                "count": watchlist.len(),
            }))
        }
        WatchlistAction::Remove { symbol } => {
            let removed = watchlist.remove(symbol);
            if removed {
                store.save(&watchlist)?;
            }
            Ok(json!({
                "action": "remove",
                "symbol": symbol,
                "removed": removed,
                "count": watchlist.len(),
            }))
        }
        WatchlistAction::List => Ok(json!({
            "count": watchlist.len(),
            "entries": watchlist.entries(),
        })),
    }
}
