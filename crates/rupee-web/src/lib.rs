//! # Rupee Web
//!
//! HTTP surface over the ingestion coordinator and query service.
//!
//! | Route | Query | Success | Failure |
//! |-------|-------|---------|---------|
//! | `GET /health` | | `200 {status, timestamp, banks}` | |
//! | `GET /fetch-rate` | `bank?` | `200 {stored, errors?}` | `400` unknown bank, `500` nothing stored |
//! | `GET /latest-rate` | `bank?` | `200 {rate, fetchedAt, bank}` | `404` no match |
//! | `GET /history` | `bank?`, `period?` | `200 [{rate, fetchedAt, bank}]` | |
//! | `GET /banks` | | `200 {banks}` | |

mod error;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{
    HeaderName, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN,
};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use rupee_core::{IngestionCoordinator, RateQueryService};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use error::ApiError;
pub use handlers::{BankQuery, BanksResponse, FetchResponse, HealthResponse, HistoryQuery};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: IngestionCoordinator,
    pub queries: RateQueryService,
}

impl AppState {
    pub fn new(coordinator: IngestionCoordinator, queries: RateQueryService) -> Self {
        Self {
            coordinator,
            queries,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/fetch-rate", get(handlers::fetch_rate))
        .route("/latest-rate", get(handlers::latest_rate))
        .route("/history", get(handlers::history))
        .route("/banks", get(handlers::banks))
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            CONTENT_TYPE,
            CONTENT_LENGTH,
            ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            AUTHORIZATION,
        ])
}

/// Serve the API on `addr` until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let banks = state.coordinator.registry().banks();
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, ?banks, "server started");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
