//! Bank-specific [`RateExtractor`](crate::RateExtractor) implementations.
//!
//! | Bank | Source | Extractor |
//! |------|--------|-----------|
//! | `SAMPATH` | JSON API | [`SampathExtractor`] |
//! | `COMMERCIAL` | JSON API | [`ComBankExtractor`] |
//! | `HNB` | HTML rate table | [`HnbExtractor`] |

mod combank;
mod hnb;
mod sampath;

pub use combank::{ComBankExtractor, COMBANK_RATES_URL};
pub use hnb::{HnbExtractor, HNB_RATES_URL};
pub use sampath::{SampathExtractor, SAMPATH_RATES_URL};

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::{ExtractionError, Rate};

/// GET `request` and return the body of a 2xx response.
async fn fetch_body(client: &dyn HttpClient, request: HttpRequest) -> Result<String, ExtractionError> {
    let response = client.execute(request).await?;
    if !response.is_success() {
        return Err(ExtractionError::upstream_status(response.status));
    }
    Ok(response.body)
}

/// Bank APIs publish rates either as JSON numbers or as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PublishedRate {
    Number(f64),
    Text(String),
}

impl PublishedRate {
    fn to_rate(&self) -> Result<Rate, ExtractionError> {
        let rate = match self {
            Self::Number(value) => Rate::new(*value)?,
            Self::Text(text) => Rate::parse(text)?,
        };
        Ok(rate)
    }
}
