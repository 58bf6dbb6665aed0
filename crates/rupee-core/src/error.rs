use thiserror::Error;

/// Validation errors for domain values exposed by `rupee-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown bank '{value}', expected one of SAMPATH, COMMERCIAL, HNB, NSB, SEYLAN, NATION")]
    UnknownBank { value: String },

    #[error("rate text '{value}' is not a number")]
    UnparsableRate { value: String },
    #[error("rate must be finite")]
    NonFiniteRate,
    #[error("rate must be greater than zero, got {value}")]
    NonPositiveRate { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp {micros}us since epoch is out of range")]
    TimestampOutOfRange { micros: i64 },
}
