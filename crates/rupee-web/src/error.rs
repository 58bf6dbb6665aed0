use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rupee_core::{IngestError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced to HTTP callers as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Failed to fetch rates from any bank")]
    NothingStored { details: Vec<String> },

    #[error("{}", not_found_message(.bank.as_deref()))]
    NotFound { bank: Option<String> },

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Ingest(IngestError::UnsupportedBank { .. }) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::NothingStored { .. } | Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn not_found_message(bank: Option<&str>) -> String {
    match bank {
        Some(bank) => format!("No rates found for bank: {bank}"),
        None => String::from("No rates found"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::NothingStored { details } => json!({
                "error": self.to_string(),
                "details": details,
            }),
            Self::Store { source, .. } => {
                error!(code = source.code(), error = %source, "{self}");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
