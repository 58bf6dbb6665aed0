//! # Rupee Warehouse
//!
//! DuckDB-backed, append-only storage for bank exchange-rate observations.
//!
//! One warehouse owns one table. The table lives in a named schema inside a
//! single `DuckDB` file:
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `bank` | `TEXT` | Canonical bank code, e.g. `SAMPATH` |
//! | `rate` | `DOUBLE` | Buying rate, always `> 0` |
//! | `fetched_at` | `TIMESTAMP` | UTC, microsecond precision |
//!
//! Rows are never updated or deleted. Every value that reaches SQL is either
//! a bound parameter or an identifier that passed [`validate_identifier`].
//!
//! ```rust,no_run
//! use rupee_warehouse::{ObservationRecord, Warehouse, WarehouseConfig};
//!
//! let warehouse = Warehouse::open(WarehouseConfig::new("rates.duckdb", "rates", "usd_lkr"))?;
//! warehouse.insert_observation(&ObservationRecord {
//!     bank: "SAMPATH".to_string(),
//!     rate: 299.5,
//!     fetched_at_micros: 1_717_200_000_000_000,
//! })?;
//! let latest = warehouse.latest_observation(Some("SAMPATH"))?;
//! # Ok::<(), rupee_warehouse::WarehouseError>(())
//! ```

pub mod duckdb;
mod migrations;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::ToSql;
use thiserror::Error;

pub use duckdb::{ConnectionPool, PooledConnection};

const MAX_IDENTIFIER_LEN: usize = 63;

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while preparing the database directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A schema or table name that cannot be used as a SQL identifier.
    #[error("invalid {kind} name '{value}': use ASCII letters, digits and underscores, not starting with a digit")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// A record that would violate the table's invariants.
    #[error("invalid observation: {0}")]
    InvalidRecord(String),
}

/// Where the observations live.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the `DuckDB` database file. `:memory:` opens a private in-memory database.
    pub db_path: PathBuf,
    /// Schema that holds the observation table.
    pub schema: String,
    /// Observation table name.
    pub table: String,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    pub fn new(
        db_path: impl Into<PathBuf>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            schema: schema.into(),
            table: table.into(),
            max_pool_size: 4,
        }
    }
}

/// A stored observation in its storage representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub bank: String,
    pub rate: f64,
    /// Microseconds since the Unix epoch, UTC.
    pub fetched_at_micros: i64,
}

impl ObservationRecord {
    fn validate(&self) -> Result<(), WarehouseError> {
        if self.bank.trim().is_empty() {
            return Err(WarehouseError::InvalidRecord(String::from(
                "bank must not be empty",
            )));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(WarehouseError::InvalidRecord(format!(
                "rate must be a positive finite number, got {}",
                self.rate
            )));
        }
        Ok(())
    }
}

/// Filter for [`Warehouse::observations`].
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    /// Restrict to one bank code; `None` means every bank.
    pub bank: Option<String>,
    /// Inclusive lower bound on `fetched_at`, in Unix microseconds.
    pub since_micros: Option<i64>,
    /// Maximum number of rows; `0` returns nothing.
    pub limit: usize,
}

/// Validated, quoted reference to the observation table.
#[derive(Debug, Clone)]
pub struct TableRef {
    schema: String,
    table: String,
}

impl TableRef {
    /// # Errors
    /// Returns [`WarehouseError::InvalidIdentifier`] if either name is unusable.
    pub fn new(schema: &str, table: &str) -> Result<Self, WarehouseError> {
        validate_identifier("schema", schema)?;
        validate_identifier("table", table)?;
        Ok(Self {
            schema: schema.to_owned(),
            table: table.to_owned(),
        })
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// `"schema"."table"`, ready to interpolate into SQL.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!(r#""{}"."{}""#, self.schema, self.table)
    }
}

/// Reject names that are not plain SQL identifiers.
///
/// # Errors
/// Returns [`WarehouseError::InvalidIdentifier`] naming `kind` and the value.
pub fn validate_identifier(kind: &'static str, value: &str) -> Result<(), WarehouseError> {
    let mut chars = value.chars();
    let starts_well = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    let rest_ok = chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');

    if starts_well && rest_ok && value.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(WarehouseError::InvalidIdentifier {
            kind,
            value: value.to_owned(),
        })
    }
}

/// Append-only observation warehouse.
#[derive(Clone)]
pub struct Warehouse {
    pool: ConnectionPool,
    target: TableRef,
}

impl Warehouse {
    /// Open (creating if needed) the database file, schema and table.
    ///
    /// # Errors
    /// Fails on invalid identifiers, unreadable paths or migration errors.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        let target = TableRef::new(&config.schema, &config.table)?;

        if !is_in_memory(config.db_path.as_path()) {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = ConnectionPool::open(config.db_path, config.max_pool_size)?;
        let warehouse = Self { pool, target };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply any pending migrations for this warehouse's table.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.pool.acquire()?;
        migrations::apply_migrations(&connection, &self.target)?;
        Ok(())
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.pool.db_path()
    }

    #[must_use]
    pub fn target(&self) -> &TableRef {
        &self.target
    }

    /// Append one observation.
    pub fn insert_observation(&self, record: &ObservationRecord) -> Result<(), WarehouseError> {
        record.validate()?;

        let connection = self.pool.acquire()?;
        let params: [&dyn ToSql; 3] = [&record.bank, &record.rate, &record.fetched_at_micros];
        connection.execute(
            &format!(
                "INSERT INTO {} (bank, rate, fetched_at) VALUES (?, ?, make_timestamp(?))",
                self.target.qualified()
            ),
            params.as_slice(),
        )?;
        Ok(())
    }

    /// Most recent observation, optionally for one bank.
    pub fn latest_observation(
        &self,
        bank: Option<&str>,
    ) -> Result<Option<ObservationRecord>, WarehouseError> {
        let mut rows = self.observations(&ObservationFilter {
            bank: bank.map(str::to_owned),
            since_micros: None,
            limit: 1,
        })?;
        Ok(rows.pop())
    }

    /// Observations matching `filter`, newest first.
    pub fn observations(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<ObservationRecord>, WarehouseError> {
        if filter.limit == 0 {
            return Ok(Vec::new());
        }

        let mut predicates = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();
        if let Some(bank) = filter.bank.as_ref() {
            predicates.push("bank = ?");
            params.push(bank);
        }
        if let Some(since) = filter.since_micros.as_ref() {
            predicates.push("fetched_at >= make_timestamp(?)");
            params.push(since);
        }

        let where_clause = if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        };
        let sql = format!(
            "SELECT bank, rate, epoch_us(fetched_at) FROM {}{} ORDER BY fetched_at DESC LIMIT {}",
            self.target.qualified(),
            where_clause,
            filter.limit
        );

        let connection = self.pool.acquire()?;
        let mut statement = connection.prepare(&sql)?;
        let mapped = statement.query_map(params.as_slice(), |row| {
            Ok(ObservationRecord {
                bank: row.get(0)?,
                rate: row.get(1)?,
                fetched_at_micros: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for record in mapped {
            records.push(record?);
        }
        Ok(records)
    }

    /// Number of stored observations, optionally for one bank.
    pub fn count_observations(&self, bank: Option<&str>) -> Result<u64, WarehouseError> {
        let connection = self.pool.acquire()?;
        let count: i64 = match bank {
            Some(bank) => connection.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE bank = ?", self.target.qualified()),
                [bank],
                |row| row.get(0),
            )?,
            None => connection.query_row(
                &format!("SELECT COUNT(*) FROM {}", self.target.qualified()),
                [],
                |row| row.get(0),
            )?,
        };
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn is_in_memory(path: &Path) -> bool {
    path.as_os_str() == ":memory:"
}
