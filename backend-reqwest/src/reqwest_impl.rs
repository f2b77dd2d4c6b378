use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use vid_core::{HttpClient, HttpResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Async HTTP client implementation using reqwest.
///
/// Statuses are passed through untouched; the wallet's networking layer
/// decides what a 4xx or 5xx means.
///
/// # Example
///
/// ```ignore
/// use backend_reqwest::ReqwestClient;
/// use vid_core::VerifiedIdClientBuilder;
///
/// let client = VerifiedIdClientBuilder::new(ReqwestClient::new()).build()?;
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new reqwest HTTP client with a 30 second timeout.
    ///
    /// Falls back to reqwest's defaults if the TLS backend cannot be
    /// initialized with the timeout applied.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap_or_else(|err| {
            log::warn!("Failed to build reqwest client with timeout: {}", err);
            Self::with_client(reqwest::Client::new())
        })
    }

    /// Create a new reqwest HTTP client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build reqwest client: {}", e))?;
        Ok(Self { client })
    }

    /// Create a new reqwest HTTP client with a custom client configuration.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn into_response(response: reqwest::Response) -> Result<HttpResponse> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to read response body: {}", e))?;
    Ok(HttpResponse::new(status, body.to_vec()))
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("HTTP GET request failed: {}", e))?;
        into_response(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("HTTP POST request failed: {}", e))?;
        into_response(response).await
    }
}
