use rupee_web::FetchResponse;
use serde_json::Value;
use tracing::warn;

use crate::cli::BankArgs;
use crate::error::CliError;

use super::Services;

/// One ingestion run. Partial failures are reported in `errors` and still
/// exit successfully; a run that stores nothing is an error.
pub async fn run(args: &BankArgs, services: &Services) -> Result<Value, CliError> {
    let report = services.coordinator.run(args.bank.as_deref()).await?;
    if report.is_total_failure() {
        return Err(CliError::NothingStored {
            details: report.failure_messages(),
        });
    }

    let errors = report.failure_messages();
    for message in &errors {
        warn!(%message, "bank skipped");
    }
    Ok(serde_json::to_value(FetchResponse {
        stored: report.stored,
        errors,
    })?)
}
