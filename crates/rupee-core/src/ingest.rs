//! Best-effort ingestion across the configured extractors.
//!
//! A run visits its target extractors one at a time, in registry order. Each
//! extraction and each insert is bounded by its own timeout; a failure or
//! timeout is recorded against that bank and the run moves on.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    BankCode, ExtractionError, ExtractorRegistry, ObservationStore, RateExtractor,
    RateObservation, StoreError, UtcDateTime,
};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Request-level failure of a run. Per-bank failures live in [`IngestReport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Bank not supported: {bank}")]
    UnsupportedBank { bank: String },
}

/// Which step of a bank's ingestion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Extraction,
    Persistence,
}

/// One bank that produced no stored observation during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankFailure {
    pub bank: BankCode,
    pub stage: FailureStage,
    pub code: &'static str,
    pub reason: String,
}

impl BankFailure {
    fn extraction(bank: BankCode, error: &ExtractionError) -> Self {
        Self {
            bank,
            stage: FailureStage::Extraction,
            code: error.code(),
            reason: error.message().to_owned(),
        }
    }

    fn persistence(bank: BankCode, error: &StoreError) -> Self {
        Self {
            bank,
            stage: FailureStage::Persistence,
            code: error.code(),
            reason: error.message().to_owned(),
        }
    }
}

impl Display for BankFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.stage {
            FailureStage::Extraction => {
                write!(f, "Error fetching rate from {}: {}", self.bank, self.reason)
            }
            FailureStage::Persistence => {
                write!(f, "Error inserting rate for {} to DB: {}", self.bank, self.reason)
            }
        }
    }
}

/// Outcome of one run: every targeted bank lands in exactly one list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub stored: Vec<RateObservation>,
    pub failures: Vec<BankFailure>,
}

impl IngestReport {
    /// Nothing was stored and at least one bank failed.
    pub fn is_total_failure(&self) -> bool {
        self.stored.is_empty() && !self.failures.is_empty()
    }

    /// Failure messages in the order the banks were visited.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

/// Drives extractors and persists their results.
#[derive(Clone)]
pub struct IngestionCoordinator {
    registry: Arc<ExtractorRegistry>,
    store: Arc<dyn ObservationStore>,
    fetch_timeout: Duration,
    store_timeout: Duration,
}

impl IngestionCoordinator {
    pub fn new(registry: Arc<ExtractorRegistry>, store: Arc<dyn ObservationStore>) -> Self {
        Self {
            registry,
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Ingest one bank (`Some(code)`) or every configured bank (`None` or blank).
    ///
    /// # Errors
    /// [`IngestError::UnsupportedBank`] if `bank` names no configured
    /// extractor. No extractor runs in that case.
    pub async fn run(&self, bank: Option<&str>) -> Result<IngestReport, IngestError> {
        let targets: Vec<Arc<dyn RateExtractor>> = match bank.map(str::trim) {
            Some(code) if !code.is_empty() => {
                let extractor = self.registry.by_name(code).ok_or_else(|| {
                    IngestError::UnsupportedBank {
                        bank: code.to_owned(),
                    }
                })?;
                vec![extractor]
            }
            _ => self.registry.all().to_vec(),
        };

        let mut report = IngestReport::default();
        for extractor in targets {
            match self.ingest_one(extractor.as_ref()).await {
                Ok(observation) => report.stored.push(observation),
                Err(failure) => {
                    warn!(
                        bank = %failure.bank,
                        code = failure.code,
                        reason = %failure.reason,
                        "{failure}"
                    );
                    report.failures.push(failure);
                }
            }
        }

        info!(
            stored = report.stored.len(),
            failed = report.failures.len(),
            "ingestion run finished"
        );
        Ok(report)
    }

    async fn ingest_one(&self, extractor: &dyn RateExtractor) -> Result<RateObservation, BankFailure> {
        let bank = extractor.bank();
        let started = Instant::now();
        debug!(bank = %bank, "fetching USD rate");

        let rate = match tokio::time::timeout(self.fetch_timeout, extractor.extract_usd_rate()).await {
            Ok(Ok(rate)) => rate,
            Ok(Err(error)) => return Err(BankFailure::extraction(bank, &error)),
            Err(_) => {
                let error = ExtractionError::timed_out(millis(self.fetch_timeout));
                return Err(BankFailure::extraction(bank, &error));
            }
        };

        let observation = RateObservation::new(bank, rate, UtcDateTime::now());
        info!(
            bank = %bank,
            rate = rate.value(),
            latency_ms = millis(started.elapsed()),
            "fetched USD rate"
        );

        // The store owns the deadline: a timed-out insert must not have written.
        match self.store.insert(&observation, self.store_timeout).await {
            Ok(()) => Ok(observation),
            Err(error) => Err(BankFailure::persistence(bank, &error)),
        }
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
