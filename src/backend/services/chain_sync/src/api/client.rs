use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::utils::errors::{Result, SyncError};

/// A single paginated GET against a chain's REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub limit: u32,
    pub key: Option<String>,
    /// Overrides the client's default request timeout.
    pub timeout: Option<Duration>,
}

impl PageRequest {
    pub fn first(url: impl Into<String>, limit: u32) -> Self {
        Self {
            url: url.into(),
            limit,
            key: None,
            timeout: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("pagination.limit", self.limit.to_string())];
        if let Some(key) = &self.key {
            query.push(("pagination.key", key.clone()));
        }
        query
    }
}

/// Outbound REST transport. Anything other than a 200 with a JSON body is a
/// `TransientFetchFailure`.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get_page(&self, request: &PageRequest) -> Result<serde_json::Value>;
}

/// `RestClient` backed by `reqwest`.
pub struct HttpRestClient {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRestClient {
    /// Create a new client; `request_timeout` applies to requests without their own.
    pub fn new(request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .user_agent(concat!("chain-sight/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            request_timeout,
        })
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn get_page(&self, request: &PageRequest) -> Result<serde_json::Value> {
        let failure = |reason: String| SyncError::TransientFetchFailure {
            url: request.url.clone(),
            reason,
        };

        debug!(url = %request.url, key = ?request.key, "GET page");

        let response = self
            .client
            .get(&request.url)
            .query(&request.query())
            .timeout(request.timeout.unwrap_or(self.request_timeout))
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("status {status}: {}", truncate(&body, 200))));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| failure(format!("invalid JSON body: {e}")))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
