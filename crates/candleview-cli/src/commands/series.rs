use candleview_core::{MarketSession, OhlcvRecord};
use serde::Serialize;
use serde_json::Value;

use crate::cli::SeriesArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SeriesResponseData<'a> {
    symbol: &'a str,
    count: usize,
    records: &'a [OhlcvRecord],
}

pub fn run(session: &MarketSession, args: &SeriesArgs) -> Result<Value, CliError> {
    match session.series_for(&args.symbol) {
        Ok(records) => Ok(serde_json::to_value(SeriesResponseData {
            symbol: &args.symbol,
            count: records.len(),
            records: &records,
        })?),
        // A valid symbol with zero rows is an empty result, not a failure.
        Err(error) if error.is_no_data() => Ok(serde_json::to_value(SeriesResponseData {
            symbol: &args.symbol,
            count: 0,
            records: &[],
        })?),
        Err(error) => Err(error.into()),
    }
}
