use serde::{Deserialize, Serialize};

use crate::{BankCode, Rate, UtcDateTime};

/// One stored USD buying rate for one bank at one instant.
///
/// Serializes as `{"rate": 301.25, "fetchedAt": "...", "bank": "SAMPATH"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateObservation {
    pub rate: Rate,
    pub fetched_at: UtcDateTime,
    pub bank: BankCode,
}

impl RateObservation {
    pub const fn new(bank: BankCode, rate: Rate, fetched_at: UtcDateTime) -> Self {
        Self {
            rate,
            fetched_at,
            bank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_persisted_field_names() {
        let observation = RateObservation::new(
            BankCode::Sampath,
            Rate::new(301.25).expect("valid rate"),
            UtcDateTime::parse("2024-06-01T04:30:00Z").expect("valid timestamp"),
        );

        let value = serde_json::to_value(observation).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "rate": 301.25,
                "fetchedAt": "2024-06-01T04:30:00Z",
                "bank": "SAMPATH"
            })
        );

        let back: RateObservation = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, observation);
    }
}
