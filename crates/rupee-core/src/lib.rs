//! # Rupee Core
//!
//! Extraction, ingestion and query pipeline for USD/LKR bank rates.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Bank codes, rates, observations, timestamps, history windows |
//! | [`extractor`] | Per-bank extraction contract and its error type |
//! | [`extractors`] | Sampath, Commercial Bank and HNB extractors |
//! | [`registry`] | Ordered set of configured extractors |
//! | [`ingest`] | Best-effort ingestion coordinator |
//! | [`store`] | Append-only observation store contract + DuckDB implementation |
//! | [`query`] | Latest and period history reads |
//! | [`http_client`] | HTTP transport abstraction |
//!
//! ## Architecture
//!
//! ```text
//! trigger ──▶ IngestionCoordinator ──▶ ExtractorRegistry ──▶ RateExtractor ──▶ HttpClient
//!                    │
//!                    ▼
//!             ObservationStore ◀── RateQueryService
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rupee_core::{
//!     ExtractorRegistryBuilder, IngestionCoordinator, RateQueryService, Warehouse,
//!     WarehouseConfig, WarehouseStore,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let warehouse = Warehouse::open(WarehouseConfig::new("rates.duckdb", "rates", "usd_lkr"))?;
//! let store = Arc::new(WarehouseStore::new(warehouse));
//! let registry = Arc::new(ExtractorRegistryBuilder::new().build()?);
//!
//! let report = IngestionCoordinator::new(registry, store.clone()).run(None).await?;
//! println!("stored {} observations", report.stored.len());
//!
//! let latest = RateQueryService::new(store).latest(Some("SAMPATH")).await?;
//! # let _ = latest;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod http_client;
pub mod ingest;
pub mod query;
pub mod registry;
pub mod store;

#[cfg(test)]
mod test_support;

pub use domain::{BankCode, Period, QueryWindow, Rate, RateObservation, UtcDateTime};
pub use error::ValidationError;
pub use extractor::{ExtractionError, ExtractionErrorKind, RateExtractor};
pub use extractors::{ComBankExtractor, HnbExtractor, SampathExtractor};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use ingest::{
    BankFailure, FailureStage, IngestError, IngestReport, IngestionCoordinator,
    DEFAULT_FETCH_TIMEOUT, DEFAULT_STORE_TIMEOUT,
};
pub use query::RateQueryService;
pub use registry::{ExtractorRegistry, ExtractorRegistryBuilder, RegistryError};
pub use store::{ObservationStore, StoreError, StoreErrorKind, StoreFuture, WarehouseStore};

// Warehouse (re-exported from rupee-warehouse)
pub use rupee_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
