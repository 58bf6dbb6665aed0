mod banks;
mod fetch;
mod history;
mod latest;
mod serve;
mod watch;

use std::sync::Arc;

use rupee_core::{
    ExtractorRegistryBuilder, IngestionCoordinator, ObservationStore, RateQueryService, Warehouse,
    WarehouseStore,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::error::CliError;

/// Wired pipeline shared by the subcommands that touch the store.
pub struct Services {
    pub coordinator: IngestionCoordinator,
    pub queries: RateQueryService,
}

impl Services {
    pub fn build(config: &AppConfig) -> Result<Self, CliError> {
        let warehouse = Warehouse::open(config.warehouse_config())?;
        debug!(
            db_path = %warehouse.db_path().display(),
            table = %warehouse.target().qualified(),
            "observation store ready"
        );
        let store: Arc<dyn ObservationStore> = Arc::new(WarehouseStore::new(warehouse));

        let registry = ExtractorRegistryBuilder::new()
            .with_banks(config.banks.iter().copied())
            .with_request_timeout_ms(millis(config.fetch_timeout))
            .build()?;

        let coordinator = IngestionCoordinator::new(Arc::new(registry), Arc::clone(&store))
            .with_fetch_timeout(config.fetch_timeout)
            .with_store_timeout(config.store_timeout);
        let queries = RateQueryService::new(store).with_store_timeout(config.store_timeout);

        Ok(Self {
            coordinator,
            queries,
        })
    }
}

/// Run the selected subcommand. `Some` output is printed to stdout.
pub async fn run(cli: &Cli) -> Result<Option<Value>, CliError> {
    let config = AppConfig::from_cli(cli)?;

    if let Command::Banks = &cli.command {
        return banks::run(&config).map(Some);
    }

    let services = Services::build(&config)?;
    match &cli.command {
        Command::Serve(args) => serve::run(args, services).await.map(|()| None),
        Command::Fetch(args) => fetch::run(args, &services).await.map(Some),
        Command::Watch(args) => watch::run(args, &services).await.map(|()| None),
        Command::Latest(args) => latest::run(args, &services).await.map(Some),
        Command::History(args) => history::run(args, &services).await.map(Some),
        Command::Banks => banks::run(&config).map(Some),
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli_on(temp: &TempDir, args: &[&str]) -> Cli {
        let db_path = temp.path().join("rates.duckdb");
        let mut argv = vec![
            "rupee",
            "--db-uri",
            db_path.to_str().expect("utf-8 temp path"),
            "--db-name",
            "rates",
            "--db-collection",
            "usd_lkr",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments parse")
    }

    #[tokio::test]
    async fn latest_on_an_empty_store_exits_with_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");

        let error = run(&cli_on(&temp, &["latest", "--bank", "HNB"]))
            .await
            .expect_err("nothing stored yet");

        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "No rates found for bank: HNB");
    }

    #[tokio::test]
    async fn history_on_an_empty_store_prints_an_empty_list() {
        let temp = tempfile::tempdir().expect("tempdir");

        let output = run(&cli_on(&temp, &["history", "--period", "month"]))
            .await
            .expect("history succeeds");

        assert_eq!(output, Some(Value::Array(Vec::new())));
    }
}
