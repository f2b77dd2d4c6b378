use anyhow::Result;
use async_trait::async_trait;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal async HTTP transport the wallet runs on.
///
/// Implementations only move bytes: non-2xx statuses must be returned as
/// an [`HttpResponse`], not as an error. Status handling, correlation
/// headers and JSON decoding happen in the library networking layer.
///
/// # Implementing the trait
///
/// ```ignore
/// use async_trait::async_trait;
/// use vid_core::{HttpClient, HttpResponse};
///
/// #[derive(Clone)]
/// struct MyHttpClient;
///
/// #[async_trait]
/// impl HttpClient for MyHttpClient {
///     async fn get(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<HttpResponse> {
///         Ok(HttpResponse::new(200, b"{}".to_vec()))
///     }
///
///     async fn post(
///         &self,
///         url: &str,
///         body: Vec<u8>,
///         headers: &[(String, String)],
///     ) -> anyhow::Result<HttpResponse> {
///         Ok(HttpResponse::new(200, Vec::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync + Clone {
    /// Perform a GET request.
    ///
    /// # Arguments
    /// * `url` - The full URL to request
    /// * `headers` - Header fields to send, a field may appear more than once
    ///
    /// # Returns
    /// The response status and raw body
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse>;

    /// Perform a POST request with an already encoded body.
    ///
    /// # Arguments
    /// * `url` - The full URL to request
    /// * `body` - Encoded request body
    /// * `headers` - Header fields to send, including `Content-Type`
    ///
    /// # Returns
    /// The response status and raw body
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse>;
}
