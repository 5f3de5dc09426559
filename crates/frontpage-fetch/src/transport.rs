//! Transports to the content store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::TransportError,
    request::{QueryRequest, TransportChoice},
};

/// A read path to the content store.
///
/// Implementations are built once and shared by concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which read path this is.
    fn choice(&self) -> TransportChoice;

    /// Run a query and return the store's `result` value.
    async fn execute(&self, request: &QueryRequest) -> Result<Value, TransportError>;
}

/// HTTP client for the store's query API.
///
/// Issues `GET {base}/v{version}/data/query/{dataset}` with the query,
/// `$`-prefixed JSON parameters and the perspective in the query string.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_version: String,
    dataset: String,
    choice: TransportChoice,
}

impl HttpTransport {
    /// Create a transport against `base_url`.
    ///
    /// `timeout` bounds each request; the gateway adds none of its own.
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        dataset: impl Into<String>,
        choice: TransportChoice,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("frontpage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_version = api_version.into();
        let api_version = api_version
            .strip_prefix('v')
            .map(str::to_string)
            .unwrap_or(api_version);

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version,
            dataset: dataset.into(),
            choice,
        })
    }

    /// Endpoint queried by this transport.
    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.base_url, self.api_version, self.dataset
        )
    }

    fn query_pairs(request: &QueryRequest) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(request.params.len() + 2);
        pairs.push(("query".to_string(), request.query.clone()));
        for (name, value) in &request.params {
            pairs.push((format!("${name}"), value.to_string()));
        }
        pairs.push((
            "perspective".to_string(),
            request.perspective.as_str().to_string(),
        ));
        pairs
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn choice(&self) -> TransportChoice {
        self.choice
    }

    async fn execute(&self, request: &QueryRequest) -> Result<Value, TransportError> {
        let mut builder = self
            .client
            .get(self.query_url())
            .query(&Self::query_pairs(request));
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token.expose());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = store_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            tracing::debug!(status = status.as_u16(), %message, "content store rejected query");
            return Err(TransportError::Store {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<Value>().await? {
            Value::Object(mut envelope) => Ok(envelope.remove("result").unwrap_or(Value::Null)),
            other => Err(TransportError::InvalidResponse(format!(
                "expected a JSON object envelope, got {other}"
            ))),
        }
    }
}

/// Pull a human-readable message out of a store error body.
///
/// Handles `{"error":{"description":..}}` and `{"error":..,"message":..}`.
fn store_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error");

    error
        .and_then(|e| e.get("description"))
        .or_else(|| value.get("message"))
        .or_else(|| error.filter(|e| e.is_string()))
        .and_then(Value::as_str)
        .map(str::to_string)
}
