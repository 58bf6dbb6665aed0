use rupee_web::BanksResponse;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::CliError;

pub fn run(config: &AppConfig) -> Result<Value, CliError> {
    Ok(serde_json::to_value(BanksResponse {
        banks: config.banks.clone(),
    })?)
}
