use crate::core::currency::CurrencyCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("Amount must be a finite number, got {0}")]
    InvalidAmount(f64),

    #[error("Missing currency code for `{0}`")]
    MissingCurrency(&'static str),

    #[error("No exchange rate available for {from} -> {to}")]
    RateUnavailable { from: CurrencyCode, to: CurrencyCode },
}

/// A validated conversion request with normalized currency codes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub amount: f64,
}

impl ConversionRequest {
    pub fn new(source: &str, target: &str, amount: f64) -> Result<Self, ConversionError> {
        let source = CurrencyCode::new(source);
        let target = CurrencyCode::new(target);
        if source.is_empty() {
            return Err(ConversionError::MissingCurrency("from_currency"));
        }
        if target.is_empty() {
            return Err(ConversionError::MissingCurrency("to_currency"));
        }
        if !amount.is_finite() {
            return Err(ConversionError::InvalidAmount(amount));
        }
        Ok(Self {
            source,
            target,
            amount,
        })
    }
}

/// Where the rate of a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    #[serde(rename = "from")]
    pub source: CurrencyCode,
    #[serde(rename = "to")]
    pub target: CurrencyCode,
    pub amount: f64,
    pub rate: f64,
    pub result: f64,
    #[serde(rename = "source")]
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl ConversionResult {
    /// Builds a result stamped with the current time; `result` is always `amount * rate`.
    pub fn new(request: &ConversionRequest, rate: f64, origin: Origin) -> Self {
        Self {
            source: request.source.clone(),
            target: request.target.clone(),
            amount: request.amount,
            rate,
            result: request.amount * rate,
            origin,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let request = ConversionRequest::new("usd", " eur", -3.5).unwrap();
        assert_eq!(request.source.as_str(), "USD");
        assert_eq!(request.target.as_str(), "EUR");
        assert_eq!(request.amount, -3.5);

        assert_eq!(
            ConversionRequest::new("", "EUR", 1.0),
            Err(ConversionError::MissingCurrency("from_currency"))
        );
        assert_eq!(
            ConversionRequest::new("USD", " ", 1.0),
            Err(ConversionError::MissingCurrency("to_currency"))
        );
        assert!(matches!(
            ConversionRequest::new("USD", "EUR", f64::NAN),
            Err(ConversionError::InvalidAmount(_))
        ));
        assert!(ConversionRequest::new("USD", "EUR", f64::INFINITY).is_err());
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let request = ConversionRequest::new("USD", "EUR", 100.0).unwrap();
        let result = ConversionResult::new(&request, 0.92, Origin::Fallback);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["from"], "USD");
        assert_eq!(json["to"], "EUR");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["rate"], 0.92);
        assert_eq!(json["result"], 100.0 * 0.92);
        assert_eq!(json["source"], "fallback");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }
}
