use serde_json::Value;

use crate::cli::HistoryArgs;
use crate::error::CliError;

use super::Services;

pub async fn run(args: &HistoryArgs, services: &Services) -> Result<Value, CliError> {
    let observations = services
        .queries
        .history(args.bank.as_deref(), Some(args.period.as_str()))
        .await?;
    Ok(serde_json::to_value(observations)?)
}
