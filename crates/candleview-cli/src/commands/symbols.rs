use candleview_core::MarketSession;
use serde_json::{json, Value};

use crate::error::CliError;

pub fn run(session: &MarketSession) -> Result<Value, CliError> {
    let symbols = session.list_symbols()?;
    Ok(json!({
        "count": symbols.len(),
        "symbols": symbols,
    }))
}
