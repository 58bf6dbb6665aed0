//! Read side: latest observation and period-bucketed history.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::ingest::{millis, DEFAULT_STORE_TIMEOUT};
use crate::{BankCode, ObservationStore, Period, RateObservation, StoreError, UtcDateTime};

/// Translates caller parameters into store reads.
///
/// Bank filters are lenient: a missing, blank or unrecognised bank code reads
/// across all banks. Period names are lenient the same way (see
/// [`Period::from_name`]).
#[derive(Clone)]
pub struct RateQueryService {
    store: Arc<dyn ObservationStore>,
    store_timeout: Duration,
}

impl RateQueryService {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Newest observation; `Ok(None)` when nothing matches.
    pub async fn latest(&self, bank: Option<&str>) -> Result<Option<RateObservation>, StoreError> {
        let bank = resolve_bank(bank);
        self.bounded(self.store.latest(bank)).await
    }

    /// History over the named period ending now.
    pub async fn history(
        &self,
        bank: Option<&str>,
        period: Option<&str>,
    ) -> Result<Vec<RateObservation>, StoreError> {
        self.history_at(bank, period, UtcDateTime::now()).await
    }

    /// History over the named period ending at `now`.
    pub async fn history_at(
        &self,
        bank: Option<&str>,
        period: Option<&str>,
        now: UtcDateTime,
    ) -> Result<Vec<RateObservation>, StoreError> {
        let bank = resolve_bank(bank);
        let window = Period::from_name(period).window_ending(now);
        self.bounded(self.store.history(bank, window)).await
    }

    async fn bounded<T>(
        &self,
        operation: crate::StoreFuture<'_, T>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, operation)
            .await
            .unwrap_or_else(|_| Err(StoreError::timed_out(millis(self.store_timeout))))
    }
}

fn resolve_bank(bank: Option<&str>) -> Option<BankCode> {
    let code = bank.map(str::trim).filter(|code| !code.is_empty())?;
    match code.parse::<BankCode>() {
        Ok(bank) => Some(bank),
        Err(error) => {
            warn!(%error, "ignoring unrecognised bank filter");
            None
        }
    }
}
