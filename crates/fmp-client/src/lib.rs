//! Financial Modeling Prep client for trailing-twelve-months metrics.

pub mod endpoint;

pub use endpoint::{Endpoint, FieldMap, TickerPlacement};

use async_trait::async_trait;
use formula_core::{FetchFailure, MetricsProvider, RawMetrics};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct FmpClient {
    api_key: String,
    base_url: String,
    endpoint: Endpoint,
    timeout: Duration,
    client: Client,
}

impl FmpClient {
    pub fn new(api_key: String, endpoint: Endpoint) -> Self {
        Self::with_options(api_key, DEFAULT_BASE_URL.to_string(), endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        api_key: String,
        base_url: String,
        endpoint: Endpoint,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to build HTTP client ({}), falling back to defaults; timeout is set per request",
                    e
                );
                Client::new()
            });

        Self {
            api_key,
            base_url,
            endpoint,
            timeout,
            client,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the most recent TTM metrics for `ticker`. One request, no retries.
    pub async fn get_metrics(&self, ticker: &str) -> Result<RawMetrics, FetchFailure> {
        let url = self.endpoint.url(&self.base_url, ticker)?;

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let TickerPlacement::QueryParam(param) = &self.endpoint.ticker {
            query.push((param.as_str(), ticker));
        }
        query.push(("apikey", self.api_key.as_str()));

        tracing::debug!("GET {} ({})", url, ticker);
        let response = self
            .client
            .get(url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.as_object().and_then(endpoint::provider_message).map(String::from))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(FetchFailure::Unauthorized(msg));
        }

        if !status.is_success() {
            return Err(FetchFailure::HttpStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(map_reqwest_error)?;
        self.endpoint.extract(ticker, body)
    }
}

#[async_trait]
impl MetricsProvider for FmpClient {
    async fn fetch(&self, ticker: &str) -> Result<RawMetrics, FetchFailure> {
        self.get_metrics(ticker).await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_decode() {
        FetchFailure::Parse(e.to_string())
    } else {
        FetchFailure::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, endpoint: Endpoint) -> FmpClient {
        FmpClient::with_options(
            "test-key".to_string(),
            server.uri(),
            endpoint,
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn test_key_metrics_uses_symbol_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/key-metrics-ttm"))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "2024-09-28", "earningsYieldTTM": 0.031, "returnOnInvestedCapitalTTM": 0.52}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client(&server, Endpoint::key_metrics_ttm())
            .get_metrics("AAPL")
            .await
            .unwrap();

        assert_eq!(raw.ticker, "AAPL");
        assert_eq!(raw.earnings_yield, Some(0.031));
        assert_eq!(raw.return_on_capital, Some(0.52));
        assert_eq!(raw.report_date.as_deref(), Some("2024-09-28"));
    }

    #[tokio::test]
    async fn test_ratios_uses_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ratios-ttm/WEGE3.SA"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"earningsYield": 0.04, "returnOnCapitalEmployed": 0.31}
            ])))
            .mount(&server)
            .await;

        let raw = client(&server, Endpoint::ratios_ttm())
            .fetch("WEGE3.SA")
            .await
            .unwrap();

        assert_eq!(raw.earnings_yield, Some(0.04));
        assert_eq!(raw.return_on_capital, Some(0.31));
    }

    #[tokio::test]
    async fn test_reserved_characters_in_ticker_reach_the_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ratios-ttm/BRK"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"earningsYield": 0.9, "returnOnCapitalEmployed": 0.9}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"earningsYield": 0.05, "returnOnCapitalEmployed": 0.12}
            ])))
            .mount(&server)
            .await;

        let raw = client(&server, Endpoint::ratios_ttm())
            .get_metrics("BRK#B")
            .await
            .unwrap();

        assert_eq!(raw.ticker, "BRK#B");
        assert_eq!(raw.earnings_yield, Some(0.05));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/api/v3/ratios-ttm/BRK%23B");
        assert!(requests[0]
            .url
            .query_pairs()
            .any(|(k, v)| k == "apikey" && v == "test-key"));
    }

    #[tokio::test]
    async fn test_invalid_base_url_fails_per_ticker() {
        let client = FmpClient::with_options(
            "test-key".to_string(),
            "not a url".to_string(),
            Endpoint::ratios_ttm(),
            Duration::from_millis(500),
        );
        let err = client.get_metrics("X").await.unwrap_err();
        assert!(matches!(err, FetchFailure::Network(_)));
    }

    #[tokio::test]
    async fn test_custom_endpoint_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stable/metrics"))
            .and(query_param("ticker", "BBAS3.SA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"ey": 0.15, "roce": 0.11}
            ])))
            .mount(&server)
            .await;

        let endpoint = Endpoint::custom("/stable/metrics", Some("ticker".to_string()), "ey", "roce");
        let raw = client(&server, endpoint).get_metrics("BBAS3.SA").await.unwrap();

        assert_eq!(raw.earnings_yield, Some(0.15));
        assert_eq!(raw.return_on_capital, Some(0.11));
    }

    #[tokio::test]
    async fn test_empty_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client(&server, Endpoint::key_metrics_ttm())
            .get_metrics("NOPE")
            .await
            .unwrap_err();
        assert_eq!(err, FetchFailure::EmptyResponse);
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server, Endpoint::ratios_ttm())
            .get_metrics("X")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchFailure::HttpStatus {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "Error Message": "Invalid API KEY. Feel free to create a Free API Key."
            })))
            .mount(&server)
            .await;

        let err = client(&server, Endpoint::key_metrics_ttm())
            .get_metrics("X")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchFailure::Unauthorized(
                "Invalid API KEY. Feel free to create a Free API Key.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_forbidden_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server, Endpoint::key_metrics_ttm())
            .get_metrics("X")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client(&server, Endpoint::key_metrics_ttm())
            .get_metrics("X")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchFailure::Parse(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client(&server, Endpoint::key_metrics_ttm());
        assert_eq!(client.timeout(), Duration::from_millis(500));
        let err = client.get_metrics("X").await.unwrap_err();
        assert_eq!(err, FetchFailure::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        let client = FmpClient::with_options(
            "test-key".to_string(),
            "http://127.0.0.1:1".to_string(),
            Endpoint::ratios_ttm(),
            Duration::from_millis(500),
        );
        let err = client.get_metrics("X").await.unwrap_err();
        assert!(matches!(err, FetchFailure::Network(_) | FetchFailure::Timeout));
    }
}
