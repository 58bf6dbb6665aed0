use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::fetch_body;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{BankCode, ExtractionError, Rate, RateExtractor};

pub const HNB_RATES_URL: &str = "https://www.hnb.net/exchange-rates";

/// Minimum `td.exrateText` cells in a rate row: label, currency, buying, selling.
const MIN_RATE_CELLS: usize = 4;

/// Hatton National Bank published rate table (HTML).
#[derive(Clone)]
pub struct HnbExtractor {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout_ms: u64,
}

impl Default for HnbExtractor {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl HnbExtractor {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: String::from(HNB_RATES_URL),
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

impl RateExtractor for HnbExtractor {
    fn bank(&self) -> BankCode {
        BankCode::Hnb
    }

    fn extract_usd_rate<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Rate, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.endpoint.as_str())
                .with_header("accept", "text/html")
                .with_timeout_ms(self.timeout_ms);
            let body = fetch_body(self.http_client.as_ref(), request).await?;
            // `Html` is not `Send`; parse after the last await.
            let quote = find_usd_row(&body)?;
            debug!(
                bank = %BankCode::Hnb,
                buying = %quote.buying,
                selling = %quote.selling,
                "parsed HNB USD row"
            );
            Ok(Rate::parse(&quote.buying)?)
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
struct UsdRow {
    buying: String,
    selling: String,
}

fn find_usd_row(body: &str) -> Result<UsdRow, ExtractionError> {
    let row_selector = Selector::parse("tr")
        .map_err(|e| ExtractionError::internal(format!("invalid row selector: {e}")))?;
    let cell_selector = Selector::parse("td.exrateText")
        .map_err(|e| ExtractionError::internal(format!("invalid cell selector: {e}")))?;

    let document = Html::parse_document(body);
    for row in document.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.len() >= MIN_RATE_CELLS && cells[1] == "USD" {
            return Ok(UsdRow {
                buying: cells[2].clone(),
                selling: cells[3].clone(),
            });
        }
    }

    Err(ExtractionError::missing_usd())
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_owned()
}
