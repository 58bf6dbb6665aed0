use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use rupee_core::{BankCode, RateObservation, UtcDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct BankQuery {
    pub bank: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub bank: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: UtcDateTime,
    pub banks: usize,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub stored: Vec<RateObservation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BanksResponse {
    pub banks: Vec<BankCode>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: UtcDateTime::now(),
        banks: state.coordinator.registry().len(),
    })
}

pub async fn fetch_rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BankQuery>,
) -> Result<Json<FetchResponse>, ApiError> {
    let report = state.coordinator.run(query.bank.as_deref()).await?;
    if report.is_total_failure() {
        return Err(ApiError::NothingStored {
            details: report.failure_messages(),
        });
    }

    info!(
        stored = report.stored.len(),
        failed = report.failures.len(),
        "fetch-rate completed"
    );
    let errors = report.failure_messages();
    Ok(Json(FetchResponse {
        stored: report.stored,
        errors,
    }))
}

pub async fn latest_rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BankQuery>,
) -> Result<Json<RateObservation>, ApiError> {
    let bank = non_blank(query.bank);
    let latest = state
        .queries
        .latest(bank.as_deref())
        .await
        .map_err(ApiError::store("Failed to fetch latest rate"))?;
    latest.map(Json).ok_or(ApiError::NotFound { bank })
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<RateObservation>>, ApiError> {
    let observations = state
        .queries
        .history(query.bank.as_deref(), query.period.as_deref())
        .await
        .map_err(ApiError::store("Failed to fetch history"))?;
    Ok(Json(observations))
}

pub async fn banks(State(state): State<Arc<AppState>>) -> Json<BanksResponse> {
    Json(BanksResponse {
        banks: state.coordinator.registry().banks(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
