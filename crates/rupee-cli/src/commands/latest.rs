use serde_json::Value;

use crate::cli::BankArgs;
use crate::error::CliError;

use super::Services;

pub async fn run(args: &BankArgs, services: &Services) -> Result<Value, CliError> {
    let bank = args
        .bank
        .as_deref()
        .map(str::trim)
        .filter(|bank| !bank.is_empty());

    match services.queries.latest(bank).await? {
        Some(observation) => Ok(serde_json::to_value(observation)?),
        None => Err(CliError::NotFound(match bank {
            Some(bank) => format!("No rates found for bank: {bank}"),
            None => String::from("No rates found"),
        })),
    }
}
