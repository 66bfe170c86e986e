//! Picks the rate for a conversion: live provider first, fallback table second.

use crate::core::conversion::{ConversionError, ConversionRequest, ConversionResult, Origin};
use crate::core::currency::{ProviderError, RateProvider};
use crate::core::fallback::{FallbackTable, RateQuery};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RateResolver {
    provider: Option<Arc<dyn RateProvider>>,
    table: Arc<FallbackTable>,
    timeout: Duration,
}

impl RateResolver {
    pub fn new(provider: Arc<dyn RateProvider>, table: Arc<FallbackTable>) -> Self {
        Self {
            provider: Some(provider),
            table,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// A resolver that never contacts a provider and answers from the table only.
    pub fn offline(table: Arc<FallbackTable>) -> Self {
        Self {
            provider: None,
            table,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the raw inputs and converts.
    pub async fn resolve(
        &self,
        source: &str,
        target: &str,
        amount: f64,
    ) -> Result<ConversionResult, ConversionError> {
        let request = ConversionRequest::new(source, target, amount)?;
        self.convert(&request).await
    }

    #[instrument(
        name = "RateResolve",
        skip(self, request),
        fields(from = %request.source, to = %request.target, amount = request.amount)
    )]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        if request.source == request.target {
            debug!("Identity conversion, skipping provider");
            return Ok(ConversionResult::new(request, 1.0, Origin::Live));
        }

        if let Some(provider) = &self.provider {
            match self.live_rate(provider.as_ref(), request).await {
                Ok(rate) => {
                    debug!(rate, provider = provider.name(), "Using live rate");
                    return Ok(ConversionResult::new(request, rate, Origin::Live));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Live rate unavailable, using fallback table"
                    );
                }
            }
        }

        match self.table.resolve(&request.source, &request.target) {
            RateQuery::Found(rate) => {
                debug!(rate, "Using fallback rate");
                Ok(ConversionResult::new(request, rate, Origin::Fallback))
            }
            RateQuery::NotFound => {
                info!("No rate available for pair");
                Err(ConversionError::RateUnavailable {
                    from: request.source.clone(),
                    to: request.target.clone(),
                })
            }
        }
    }

    async fn live_rate(
        &self,
        provider: &dyn RateProvider,
        request: &ConversionRequest,
    ) -> Result<f64, ProviderError> {
        let quote = tokio::time::timeout(
            self.timeout,
            provider.fetch_rate(&request.source, &request.target, request.amount),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))??;

        if !quote.rate.is_finite() {
            return Err(ProviderError::MissingField("info.rate"));
        }
        Ok(quote.rate)
    }
}
