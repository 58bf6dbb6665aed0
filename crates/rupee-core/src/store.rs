//! Observation persistence seam.
//!
//! [`ObservationStore`] is append-only: the core inserts and reads, never
//! updates or deletes. [`WarehouseStore`] is the DuckDB-backed
//! implementation used in production.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rupee_warehouse::{ObservationFilter, ObservationRecord, Warehouse, WarehouseError};

use crate::ingest::millis;
use crate::{BankCode, QueryWindow, Rate, RateObservation, UtcDateTime};

/// Boxed future returned by [`ObservationStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Classification of a persistence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The backing store rejected or could not run the operation.
    Unavailable,
    /// The operation did not finish within the store timeout.
    Timeout,
    /// A stored row could not be turned back into an observation.
    Corrupt,
}

/// Structured persistence error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn timed_out(timeout_ms: u64) -> Self {
        Self {
            kind: StoreErrorKind::Timeout,
            message: format!("store operation timed out after {timeout_ms}ms"),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Corrupt,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            StoreErrorKind::Unavailable => "store.unavailable",
            StoreErrorKind::Timeout => "store.timeout",
            StoreErrorKind::Corrupt => "store.corrupt",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for StoreError {}

impl From<WarehouseError> for StoreError {
    fn from(error: WarehouseError) -> Self {
        match error {
            WarehouseError::InvalidRecord(message) => Self::corrupt(message),
            other => Self::unavailable(other.to_string()),
        }
    }
}

/// Append-only time-series store of [`RateObservation`]s.
pub trait ObservationStore: Send + Sync {
    /// Persist one observation. Either the whole record is written or nothing is.
    ///
    /// `timeout` bounds how long the write may wait to start. An `Err` means
    /// the record was not written; a write that has started is reported with
    /// its real outcome even if that arrives after `timeout`.
    fn insert<'a>(
        &'a self,
        observation: &'a RateObservation,
        timeout: Duration,
    ) -> StoreFuture<'a, ()>;

    /// Newest observation by `fetchedAt`, for one bank or across all banks.
    fn latest<'a>(&'a self, bank: Option<BankCode>) -> StoreFuture<'a, Option<RateObservation>>;

    /// Observations with `fetchedAt >= window.start`, newest first, at most
    /// `window.max_results` of them.
    fn history<'a>(
        &'a self,
        bank: Option<BankCode>,
        window: QueryWindow,
    ) -> StoreFuture<'a, Vec<RateObservation>>;
}

const INSERT_PENDING: u8 = 0;
const INSERT_STARTED: u8 = 1;
const INSERT_ABANDONED: u8 = 2;

/// [`ObservationStore`] over a [`Warehouse`]. Each call runs on the blocking
/// thread pool with its own pooled connection.
#[derive(Clone)]
pub struct WarehouseStore {
    warehouse: Warehouse,
}

impl WarehouseStore {
    pub fn new(warehouse: Warehouse) -> Self {
        Self { warehouse }
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Warehouse) -> Result<T, WarehouseError> + Send + 'static,
    {
        let warehouse = self.warehouse.clone();
        tokio::task::spawn_blocking(move || operation(warehouse))
            .await
            .map_err(|e| StoreError::unavailable(format!("store task failed: {e}")))?
            .map_err(StoreError::from)
    }
}

impl ObservationStore for WarehouseStore {
    fn insert<'a>(
        &'a self,
        observation: &'a RateObservation,
        timeout: Duration,
    ) -> StoreFuture<'a, ()> {
        let record = to_record(observation);
        let warehouse = self.warehouse.clone();
        Box::pin(async move {
            let state = Arc::new(AtomicU8::new(INSERT_PENDING));
            let claim = Arc::clone(&state);
            let mut task = tokio::task::spawn_blocking(move || {
                let started = claim.compare_exchange(
                    INSERT_PENDING,
                    INSERT_STARTED,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                if started.is_err() {
                    return None;
                }
                Some(warehouse.insert_observation(&record))
            });

            let joined = match tokio::time::timeout(timeout, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let abandoned = state
                        .compare_exchange(
                            INSERT_PENDING,
                            INSERT_ABANDONED,
                            Ordering::SeqCst,
                            Ordering::SeqCst,
                        )
                        .is_ok();
                    if abandoned {
                        return Err(StoreError::timed_out(millis(timeout)));
                    }
                    // Already running: DuckDB cannot roll it back from here.
                    task.await
                }
            };

            joined
                .map_err(|e| StoreError::unavailable(format!("store task failed: {e}")))?
                .ok_or_else(|| StoreError::timed_out(millis(timeout)))?
                .map_err(StoreError::from)
        })
    }

    fn latest<'a>(&'a self, bank: Option<BankCode>) -> StoreFuture<'a, Option<RateObservation>> {
        Box::pin(async move {
            let record = self
                .run_blocking(move |warehouse| {
                    warehouse.latest_observation(bank.map(BankCode::as_str))
                })
                .await?;
            record.map(from_record).transpose()
        })
    }

    fn history<'a>(
        &'a self,
        bank: Option<BankCode>,
        window: QueryWindow,
    ) -> StoreFuture<'a, Vec<RateObservation>> {
        let filter = ObservationFilter {
            bank: bank.map(|code| code.as_str().to_owned()),
            since_micros: Some(window.start.unix_micros()),
            limit: window.max_results,
        };
        Box::pin(async move {
            let records = self
                .run_blocking(move |warehouse| warehouse.observations(&filter))
                .await?;
            records.into_iter().map(from_record).collect()
        })
    }
}

fn to_record(observation: &RateObservation) -> ObservationRecord {
    ObservationRecord {
        bank: observation.bank.as_str().to_owned(),
        rate: observation.rate.value(),
        fetched_at_micros: observation.fetched_at.unix_micros(),
    }
}

fn from_record(record: ObservationRecord) -> Result<RateObservation, StoreError> {
    let bank = record
        .bank
        .parse::<BankCode>()
        .map_err(|e| StoreError::corrupt(format!("stored row has {e}")))?;
    let rate = Rate::new(record.rate)
        .map_err(|e| StoreError::corrupt(format!("stored {bank} row: {e}")))?;
    let fetched_at = UtcDateTime::from_unix_micros(record.fetched_at_micros)
        .map_err(|e| StoreError::corrupt(format!("stored {bank} row: {e}")))?;
    Ok(RateObservation::new(bank, rate, fetched_at))
}
