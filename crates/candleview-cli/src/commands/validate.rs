use serde_json::{json, Value};

use crate::cli::Cli;
use crate::error::CliError;

/// Run the full load/validate pipeline and report the outcome instead of
/// failing the process, so scripts can inspect the reason.
pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    match super::load_session(cli, None).await {
        Ok(session) => {
            let symbols = session.list_symbols()?;
            Ok(json!({
                "valid": true,
                "symbols": symbols.len(),
            }))
        }
        Err(CliError::Load(error)) => Ok(json!({
            "valid": false,
            "reason": error.to_string(),
        })),
        Err(error) => Err(error),
    }
}
