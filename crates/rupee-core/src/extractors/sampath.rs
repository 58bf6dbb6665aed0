use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_body, PublishedRate};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_USER_AGENT};
use crate::{BankCode, ExtractionError, Rate, RateExtractor};

pub const SAMPATH_RATES_URL: &str = "https://www.sampath.lk/api/exchange-rates";

/// Sampath Bank JSON rate API.
#[derive(Clone)]
pub struct SampathExtractor {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout_ms: u64,
}

impl Default for SampathExtractor {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl SampathExtractor {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: String::from(SAMPATH_RATES_URL),
            timeout_ms: 10_000,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl RateExtractor for SampathExtractor {
    fn bank(&self) -> BankCode {
        BankCode::Sampath
    }

    fn extract_usd_rate<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Rate, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            // The API refuses requests without an identifying agent.
            let request = HttpRequest::get(self.endpoint.as_str())
                .with_header("user-agent", DEFAULT_USER_AGENT)
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);
            let body = fetch_body(self.http_client.as_ref(), request).await?;
            parse_payload(&body)
        })
    }
}

#[derive(Debug, Deserialize)]
struct SampathPayload {
    success: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    data: Vec<SampathRate>,
}

#[derive(Debug, Deserialize)]
struct SampathRate {
    #[serde(rename = "CurrCode")]
    currency: String,
    #[serde(rename = "TTBUY")]
    tt_buy: PublishedRate,
}

fn parse_payload(body: &str) -> Result<Rate, ExtractionError> {
    let payload: SampathPayload = serde_json::from_str(body)
        .map_err(|e| ExtractionError::malformed(format!("failed to decode Sampath response: {e}")))?;

    if !payload.success {
        let description = payload
            .description
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| String::from("no description"));
        return Err(ExtractionError::rejected(format!(
            "Sampath API reported failure: {description}"
        )));
    }

    payload
        .data
        .iter()
        .find(|entry| entry.currency.trim() == "USD")
        .ok_or_else(ExtractionError::missing_usd)?
        .tt_buy
        .to_rate()
}
