//! Currency codes and the live rate provider abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper-cased currency identifier, e.g. `USD`.
///
/// All comparisons and table lookups go through this type, so `usd` and `USD`
/// always refer to the same currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        CurrencyCode::new(code)
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        CurrencyCode::new(&code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Rate reported by a live provider for a single conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveQuote {
    pub rate: f64,
    /// Converted amount as reported by the provider. Only used to validate the
    /// payload and for logging; callers recompute `amount * rate`.
    pub result: f64,
}

/// Failures of a live provider. Every variant is recoverable: the resolver
/// answers from the fallback table instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Failed to parse provider response: {0}")]
    MalformedPayload(String),

    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    #[error("Provider response is missing numeric field `{0}`")]
    MissingField(&'static str),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: f64,
    ) -> Result<LiveQuote, ProviderError>;
}
