use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_body, PublishedRate};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{BankCode, ExtractionError, Rate, RateExtractor};

pub const COMBANK_RATES_URL: &str = "https://www.combank.lk/api/exchange-rates";

/// Commercial Bank JSON rate API.
#[derive(Clone)]
pub struct ComBankExtractor {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout_ms: u64,
}

impl Default for ComBankExtractor {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl ComBankExtractor {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: String::from(COMBANK_RATES_URL),
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

impl RateExtractor for ComBankExtractor {
    fn bank(&self) -> BankCode {
        BankCode::Commercial
    }

    fn extract_usd_rate<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Rate, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.endpoint.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);
            let body = fetch_body(self.http_client.as_ref(), request).await?;
            parse_payload(&body)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ComBankPayload {
    rates: Vec<ComBankRate>,
}

#[derive(Debug, Deserialize)]
struct ComBankRate {
    currency: String,
    buying: PublishedRate,
}

fn parse_payload(body: &str) -> Result<Rate, ExtractionError> {
    let payload: ComBankPayload = serde_json::from_str(body).map_err(|e| {
        ExtractionError::malformed(format!("failed to decode Commercial Bank response: {e}"))
    })?;

    payload
        .rates
        .iter()
        .find(|entry| entry.currency.trim().eq_ignore_ascii_case("USD"))
        .ok_or_else(ExtractionError::missing_usd)?
        .buying
        .to_rate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpResponse;
    use crate::test_support::{block_on, RecordingHttpClient};
    use crate::ExtractionErrorKind;

    #[test]
    fn extracts_numeric_buying_rate() {
        let client = Arc::new(RecordingHttpClient::responding(HttpResponse::ok(
            r#"{"rates": [
                {"currency": "USD", "buying": 299.75, "selling": 307.5},
                {"currency": "JPY", "buying": 1.98, "selling": 2.07}
            ]}"#,
        )));
        let extractor = ComBankExtractor::new(client.clone());

        let rate = block_on(extractor.extract_usd_rate()).expect("extraction succeeds");

        assert_eq!(rate.value(), 299.75);
        assert_eq!(client.recorded_requests()[0].url, COMBANK_RATES_URL);
    }

    #[test]
    fn upstream_error_status_fails_extraction() {
        let client = Arc::new(RecordingHttpClient::responding(HttpResponse {
            status: 502,
            body: String::from("bad gateway"),
        }));
        let extractor = ComBankExtractor::new(client);

        let error = block_on(extractor.extract_usd_rate()).expect_err("must fail");

        assert_eq!(error.kind(), ExtractionErrorKind::UpstreamStatus);
        assert_eq!(error.message(), "unexpected HTTP status 502");
    }

    #[test]
    fn payload_without_usd_is_reported() {
        let client = Arc::new(RecordingHttpClient::responding(HttpResponse::ok(
            r#"{"rates": []}"#,
        )));
        let extractor = ComBankExtractor::new(client).with_endpoint("http://127.0.0.1:9/rates");

        let error = block_on(extractor.extract_usd_rate()).expect_err("must fail");

        assert_eq!(error.kind(), ExtractionErrorKind::MissingUsd);
    }
}
