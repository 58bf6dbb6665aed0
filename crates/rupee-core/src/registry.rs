//! Ordered, immutable set of configured extractors.

use std::sync::Arc;

use thiserror::Error;

use crate::extractors::{ComBankExtractor, HnbExtractor, SampathExtractor};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{BankCode, RateExtractor};

/// Errors raised while assembling a registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("bank {bank} is configured more than once")]
    DuplicateBank { bank: BankCode },
    #[error("bank {bank} has no extractor implementation")]
    NoExtractor { bank: BankCode },
}

/// Extractors in configuration order, at most one per bank.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn RateExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(extractors: Vec<Arc<dyn RateExtractor>>) -> Result<Self, RegistryError> {
        let mut seen = Vec::with_capacity(extractors.len());
        for extractor in &extractors {
            let bank = extractor.bank();
            if seen.contains(&bank) {
                return Err(RegistryError::DuplicateBank { bank });
            }
            seen.push(bank);
        }
        Ok(Self { extractors })
    }

    /// Every extractor, in configuration order.
    pub fn all(&self) -> &[Arc<dyn RateExtractor>] {
        &self.extractors
    }

    /// Resolve a bank code (case-insensitive) to its configured extractor.
    pub fn by_name(&self, code: &str) -> Option<Arc<dyn RateExtractor>> {
        let bank = code.parse::<BankCode>().ok()?;
        self.get(bank)
    }

    pub fn get(&self, bank: BankCode) -> Option<Arc<dyn RateExtractor>> {
        self.extractors
            .iter()
            .find(|extractor| extractor.bank() == bank)
            .cloned()
    }

    /// Configured bank codes, in configuration order.
    pub fn banks(&self) -> Vec<BankCode> {
        self.extractors.iter().map(|extractor| extractor.bank()).collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

/// Builds a registry of the bundled extractors from an ordered bank list.
///
/// ```rust
/// use rupee_core::{BankCode, ExtractorRegistryBuilder};
///
/// let registry = ExtractorRegistryBuilder::new()
///     .with_banks([BankCode::Sampath, BankCode::Hnb])
///     .build()
///     .expect("both banks have extractors");
/// assert_eq!(registry.banks(), vec![BankCode::Sampath, BankCode::Hnb]);
/// ```
pub struct ExtractorRegistryBuilder {
    banks: Vec<BankCode>,
    http_client: Option<Arc<dyn HttpClient>>,
    request_timeout_ms: u64,
}

impl Default for ExtractorRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistryBuilder {
    /// Starts with only `SAMPATH` enabled.
    pub fn new() -> Self {
        Self {
            banks: vec![BankCode::Sampath],
            http_client: None,
            request_timeout_ms: 10_000,
        }
    }

    pub fn with_banks(mut self, banks: impl IntoIterator<Item = BankCode>) -> Self {
        self.banks = banks.into_iter().collect();
        self
    }

    /// Share one transport across extractors instead of the default reqwest client.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> Result<ExtractorRegistry, RegistryError> {
        let http_client: Arc<dyn HttpClient> = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeout_ms = self.request_timeout_ms;

        let mut extractors: Vec<Arc<dyn RateExtractor>> = Vec::with_capacity(self.banks.len());
        for bank in self.banks {
            let client = Arc::clone(&http_client);
            let extractor: Arc<dyn RateExtractor> = match bank {
                BankCode::Sampath => {
                    Arc::new(SampathExtractor::new(client).with_timeout_ms(timeout_ms))
                }
                BankCode::Commercial => {
                    Arc::new(ComBankExtractor::new(client).with_timeout_ms(timeout_ms))
                }
                BankCode::Hnb => Arc::new(HnbExtractor::new(client).with_timeout_ms(timeout_ms)),
                BankCode::Nsb | BankCode::Seylan | BankCode::Nation => {
                    return Err(RegistryError::NoExtractor { bank });
                }
            };
            extractors.push(extractor);
        }

        ExtractorRegistry::new(extractors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedExtractor, RecordingHttpClient};

    #[test]
    fn preserves_configuration_order() {
        let registry = ExtractorRegistry::new(vec![
            Arc::new(FixedExtractor::rate(BankCode::Hnb, 300.0)),
            Arc::new(FixedExtractor::rate(BankCode::Sampath, 301.0)),
        ])
        .expect("distinct banks");

        assert_eq!(registry.banks(), vec![BankCode::Hnb, BankCode::Sampath]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_two_extractors_for_one_bank() {
        let result = ExtractorRegistry::new(vec![
            Arc::new(FixedExtractor::rate(BankCode::Sampath, 300.0)),
            Arc::new(FixedExtractor::rate(BankCode::Sampath, 301.0)),
        ]);

        assert_eq!(
            result.err(),
            Some(RegistryError::DuplicateBank {
                bank: BankCode::Sampath
            })
        );
    }

    #[test]
    fn by_name_resolves_only_configured_banks() {
        let registry = ExtractorRegistry::new(vec![Arc::new(FixedExtractor::rate(
            BankCode::Sampath,
            300.0,
        ))])
        .expect("registry");

        assert!(registry.by_name("sampath").is_some());
        assert!(registry.by_name("HNB").is_none());
        assert!(registry.by_name("BADSRC").is_none());
    }

    #[test]
    fn builder_defaults_to_sampath() {
        let registry = ExtractorRegistryBuilder::new()
            .with_http_client(Arc::new(RecordingHttpClient::default()))
            .build()
            .expect("registry");

        assert_eq!(registry.banks(), vec![BankCode::Sampath]);
    }

    #[test]
    fn builder_refuses_banks_without_extractors() {
        let result = ExtractorRegistryBuilder::new()
            .with_http_client(Arc::new(RecordingHttpClient::default()))
            .with_banks([BankCode::Sampath, BankCode::Nsb])
            .build();

        assert_eq!(
            result.err(),
            Some(RegistryError::NoExtractor {
                bank: BankCode::Nsb
            })
        );
    }
}
