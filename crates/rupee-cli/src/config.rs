//! Startup configuration.
//!
//! The store location (connection string, database name, collection name)
//! is required; everything else has a default. Any problem here is fatal
//! before the store is opened.

use std::path::PathBuf;
use std::time::Duration;

use rupee_core::{BankCode, ValidationError, WarehouseConfig};
use thiserror::Error;

use crate::cli::{Cli, StoreArgs};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {setting}: set {env} or pass --{flag}")]
    Missing {
        setting: &'static str,
        env: &'static str,
        flag: &'static str,
    },

    #[error("invalid {setting}: {reason}")]
    Invalid {
        setting: &'static str,
        reason: String,
    },

    #[error(transparent)]
    UnknownBank(#[from] ValidationError),
}

/// Validated settings for every subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub db_name: String,
    pub collection: String,
    pub banks: Vec<BankCode>,
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let StoreArgs {
            db_uri,
            db_name,
            db_collection,
        } = &cli.store;

        let db_uri = required(db_uri, "connection string", "RUPEE_DB_URI", "db-uri")?;
        let db_name = required(db_name, "database name", "RUPEE_DB_NAME", "db-name")?;
        let collection = required(
            db_collection,
            "collection name",
            "RUPEE_DB_COLLECTION",
            "db-collection",
        )?;
        identifier("database name", &db_name)?;
        identifier("collection name", &collection)?;

        Ok(Self {
            db_path: PathBuf::from(db_uri),
            db_name,
            collection,
            banks: parse_banks(&cli.banks)?,
            fetch_timeout: positive_millis("fetch timeout", cli.fetch_timeout_ms)?,
            store_timeout: positive_millis("store timeout", cli.store_timeout_ms)?,
        })
    }

    pub fn warehouse_config(&self) -> WarehouseConfig {
        WarehouseConfig::new(
            self.db_path.clone(),
            self.db_name.clone(),
            self.collection.clone(),
        )
    }
}

fn required(
    value: &Option<String>,
    setting: &'static str,
    env: &'static str,
    flag: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
        .ok_or(ConfigError::Missing { setting, env, flag })
}

fn identifier(setting: &'static str, value: &str) -> Result<(), ConfigError> {
    rupee_warehouse::validate_identifier(setting, value).map_err(|e| ConfigError::Invalid {
        setting,
        reason: e.to_string(),
    })
}

fn parse_banks(values: &[String]) -> Result<Vec<BankCode>, ConfigError> {
    let mut banks = Vec::new();
    for value in values.iter().map(|value| value.trim()).filter(|value| !value.is_empty()) {
        let bank = value.parse::<BankCode>()?;
        if !bank.has_extractor() {
            return Err(ConfigError::Invalid {
                setting: "banks",
                reason: format!("{bank} has no extractor implementation"),
            });
        }
        if banks.contains(&bank) {
            return Err(ConfigError::Invalid {
                setting: "banks",
                reason: format!("{bank} is listed more than once"),
            });
        }
        banks.push(bank);
    }

    if banks.is_empty() {
        return Err(ConfigError::Invalid {
            setting: "banks",
            reason: String::from("at least one bank must be enabled"),
        });
    }
    Ok(banks)
}

fn positive_millis(setting: &'static str, millis: u64) -> Result<Duration, ConfigError> {
    if millis == 0 {
        return Err(ConfigError::Invalid {
            setting,
            reason: String::from("must be greater than zero"),
        });
    }
    Ok(Duration::from_millis(millis))
}
