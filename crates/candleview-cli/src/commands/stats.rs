use candleview_core::{MarketSession, StatisticsSummary};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::StatsArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatsResponseData<'a> {
    symbol: &'a str,
    #[serde(flatten)]
    statistics: &'a StatisticsSummary,
}

pub fn run(session: &MarketSession, args: &StatsArgs) -> Result<Value, CliError> {
    match session.statistics_for(&args.symbol) {
        Ok(statistics) => Ok(serde_json::to_value(StatsResponseData {
            symbol: &args.symbol,
            statistics: &statistics,
        })?),
        // A valid symbol with zero rows is an empty result, not a failure.
        Err(error) if error.is_no_data() => Ok(json!({
            "symbol": args.symbol,
            "no_data": true,
        })),
        Err(error) => Err(error.into()),
    }
}
