use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyCode, LiveQuote, ProviderError, RateProvider};

// ExchangeRateHostProvider implementation for RateProvider
pub struct ExchangeRateHostProvider {
    base_url: String,
    access_key: Option<String>,
    client: reqwest::Client,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("fxgate/1.0")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: None,
            client,
        })
    }

    pub fn with_access_key(mut self, access_key: Option<String>) -> Self {
        self.access_key = access_key;
        self
    }

    fn convert_url(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: f64,
    ) -> Result<Url, ProviderError> {
        let amount = amount.to_string();
        let mut params = vec![
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("amount", amount.as_str()),
        ];
        if let Some(key) = &self.access_key {
            params.push(("access_key", key.as_str()));
        }
        Url::parse_with_params(&format!("{}/convert", self.base_url), &params)
            .map_err(|e| ProviderError::MalformedPayload(format!("invalid provider URL: {e}")))
    }
}

// Numeric fields are kept as raw JSON so a string or null is reported as a
// missing number rather than a parse failure of the whole body.
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    success: Option<bool>,
    error: Option<Value>,
    result: Option<Value>,
    info: Option<ConvertInfo>,
}

#[derive(Debug, Deserialize)]
struct ConvertInfo {
    rate: Option<Value>,
}

fn finite_number(value: Option<&Value>, field: &'static str) -> Result<f64, ProviderError> {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or(ProviderError::MissingField(field))
}

fn parse_quote(body: &str) -> Result<LiveQuote, ProviderError> {
    let data: ConvertResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

    if data.success == Some(false) {
        let reason = data
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ProviderError::Rejected(reason));
    }

    let result = finite_number(data.result.as_ref(), "result")?;
    let rate = finite_number(
        data.info.as_ref().and_then(|info| info.rate.as_ref()),
        "info.rate",
    )?;
    Ok(LiveQuote { rate, result })
}

#[async_trait]
impl RateProvider for ExchangeRateHostProvider {
    fn name(&self) -> &str {
        "exchangerate.host"
    }

    #[instrument(
        name = "ExchangeRateHostFetch",
        skip(self, from, to),
        fields(from = %from, to = %to)
    )]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: f64,
    ) -> Result<LiveQuote, ProviderError> {
        let url = self.convert_url(from, to, amount)?;
        debug!("Requesting conversion from {}", url.path());

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let quote = parse_quote(&text)?;
        debug!(rate = quote.rate, result = quote.result, "Received live quote");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider_for(server: &MockServer) -> ExchangeRateHostProvider {
        ExchangeRateHostProvider::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    fn usd_eur() -> (CurrencyCode, CurrencyCode) {
        (CurrencyCode::new("USD"), CurrencyCode::new("EUR"))
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .and(query_param("amount", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success": true, "info": {"rate": 0.9312}, "result": 93.12}"#,
            ))
            .mount(&mock_server)
            .await;

        let (from, to) = usd_eur();
        let quote = provider_for(&mock_server)
            .fetch_rate(&from, &to, 100.0)
            .await
            .expect("Failed to get rate");
        assert_eq!(quote.rate, 0.9312);
        assert_eq!(quote.result, 93.12);
    }

    #[tokio::test]
    async fn test_access_key_is_forwarded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .and(query_param("access_key", "k3y"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"info": {"rate": 1.5}, "result": 1.5}"#),
            )
            .mount(&mock_server)
            .await;

        let (from, to) = usd_eur();
        let provider = provider_for(&mock_server).with_access_key(Some("k3y".to_string()));
        let quote = provider.fetch_rate(&from, &to, 1.0).await.unwrap();
        assert_eq!(quote.rate, 1.5);
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(500, "").await;
        let (from, to) = usd_eur();

        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::Status(500))));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(200, "<html>oops</html>").await;
        let (from, to) = usd_eur();

        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_missing_result_field() {
        let mock_server = create_mock_server(200, r#"{"info": {"rate": 0.9}}"#).await;
        let (from, to) = usd_eur();

        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::MissingField("result"))));
    }

    #[tokio::test]
    async fn test_missing_or_non_numeric_rate() {
        let (from, to) = usd_eur();

        let mock_server = create_mock_server(200, r#"{"result": 0.9}"#).await;
        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::MissingField("info.rate"))));

        let mock_server =
            create_mock_server(200, r#"{"result": 0.9, "info": {"rate": "0.9"}}"#).await;
        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::MissingField("info.rate"))));
    }

    #[tokio::test]
    async fn test_null_result_is_missing() {
        let mock_server =
            create_mock_server(200, r#"{"result": null, "info": {"rate": 0.9}}"#).await;
        let (from, to) = usd_eur();

        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::MissingField("result"))));
    }

    #[tokio::test]
    async fn test_provider_reported_failure() {
        let mock_server = create_mock_server(
            200,
            r#"{"success": false, "error": {"code": 101, "type": "missing_access_key"}}"#,
        )
        .await;
        let (from, to) = usd_eur();

        let result = provider_for(&mock_server).fetch_rate(&from, &to, 1.0).await;
        match result {
            Err(ProviderError::Rejected(reason)) => assert!(reason.contains("missing_access_key")),
            other => panic!("Expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/convert"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"info": {"rate": 0.9}, "result": 0.9}"#)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let (from, to) = usd_eur();
        let provider =
            ExchangeRateHostProvider::new(&mock_server.uri(), Duration::from_millis(100)).unwrap();
        let result = provider.fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let (from, to) = usd_eur();
        let provider =
            ExchangeRateHostProvider::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let result = provider.fetch_rate(&from, &to, 1.0).await;
        assert!(matches!(result, Err(ProviderError::Transport(_))));
    }
}
