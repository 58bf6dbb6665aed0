//! Per-bank rate extraction contract.
//!
//! An extractor performs exactly one attempt per call. It never retries and
//! never touches the observation store; the
//! [`IngestionCoordinator`](crate::IngestionCoordinator) owns both concerns.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::http_client::{HttpError, HttpErrorKind};
use crate::{BankCode, Rate, ValidationError};

/// Classification of a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// The request never produced a response.
    Transport,
    /// The request or the whole extraction ran out of time.
    Timeout,
    /// The bank answered with a non-2xx status.
    UpstreamStatus,
    /// The bank answered but flagged the payload as unsuccessful.
    Rejected,
    /// The payload could not be decoded.
    Malformed,
    /// The payload had no USD entry.
    MissingUsd,
    /// The USD entry was present but not a positive number.
    InvalidRate,
    Internal,
}

/// Structured extraction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    kind: ExtractionErrorKind,
    message: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn upstream_status(status: u16) -> Self {
        Self::new(
            ExtractionErrorKind::UpstreamStatus,
            format!("unexpected HTTP status {status}"),
        )
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Rejected, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Malformed, message)
    }

    pub fn missing_usd() -> Self {
        Self::new(ExtractionErrorKind::MissingUsd, "USD rate not found")
    }

    pub fn timed_out(timeout_ms: u64) -> Self {
        Self::new(
            ExtractionErrorKind::Timeout,
            format!("extraction timed out after {timeout_ms}ms"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Transport => "extract.transport",
            ExtractionErrorKind::Timeout => "extract.timeout",
            ExtractionErrorKind::UpstreamStatus => "extract.upstream_status",
            ExtractionErrorKind::Rejected => "extract.rejected",
            ExtractionErrorKind::Malformed => "extract.malformed",
            ExtractionErrorKind::MissingUsd => "extract.missing_usd",
            ExtractionErrorKind::InvalidRate => "extract.invalid_rate",
            ExtractionErrorKind::Internal => "extract.internal",
        }
    }
}

impl Display for ExtractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ExtractionError {}

impl From<HttpError> for ExtractionError {
    fn from(error: HttpError) -> Self {
        let kind = match error.kind() {
            HttpErrorKind::Timeout => ExtractionErrorKind::Timeout,
            HttpErrorKind::Connect | HttpErrorKind::Other => ExtractionErrorKind::Transport,
        };
        Self::new(kind, error.message())
    }
}

impl From<ValidationError> for ExtractionError {
    fn from(error: ValidationError) -> Self {
        Self::new(ExtractionErrorKind::InvalidRate, error.to_string())
    }
}

/// One bank's rate source.
pub trait RateExtractor: Send + Sync {
    fn bank(&self) -> BankCode;

    fn extract_usd_rate<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Rate, ExtractionError>> + Send + 'a>>;
}
