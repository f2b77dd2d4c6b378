use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::correlation::CorrelationHeader;
use super::http_trait::{HttpClient, HttpResponse};
use crate::call_site;
use crate::error::{Result, VerifiedIdError};
use crate::logger::WalletLibraryLogger;

pub const PREFER_HEADER_FIELD: &str = "prefer";
pub const INTEROP_PROFILE_VERSION: &str = "oid4vci-interop-profile-version=0.0.1";

const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Header fields added on top of the ones the networking layer sets.
pub type Headers = Vec<(String, String)>;

/// Body encodings the library posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
    Jwt,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::Jwt => "application/jwt",
        }
    }
}

/// The `prefer: oid4vci-interop-profile-version=0.0.1` header.
pub fn interop_prefer_header() -> (String, String) {
    (
        PREFER_HEADER_FIELD.to_string(),
        INTEROP_PROFILE_VERSION.to_string(),
    )
}

/// Networking layer every built-in protocol operation goes through.
#[async_trait]
pub trait LibraryNetworking: Send + Sync {
    fn reset_correlation_header(&self);

    /// Current correlation value, attached to errors surfaced to the caller.
    fn correlation_id(&self) -> Option<String>;

    /// GET `url` and return the body of a successful response.
    async fn fetch(&self, url: &Url, additional_headers: &[(String, String)]) -> Result<Vec<u8>>;

    /// POST an encoded body to `url` and return the body of a successful response.
    async fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: ContentType,
        additional_headers: &[(String, String)],
    ) -> Result<Vec<u8>>;
}

impl dyn LibraryNetworking {
    pub async fn fetch_json<T>(&self, url: &Url, additional_headers: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let body = self.fetch(url, additional_headers).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn post_json<B, T>(
        &self,
        url: &Url,
        body: &B,
        additional_headers: &[(String, String)],
    ) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let encoded = serde_json::to_vec(body)?;
        let response = self
            .post(url, encoded, ContentType::Json, additional_headers)
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }

    /// POST `fields` as `application/x-www-form-urlencoded` and return the
    /// raw response body, which may be empty.
    pub async fn post_form(
        &self,
        url: &Url,
        fields: &[(&str, &str)],
        additional_headers: &[(String, String)],
    ) -> Result<Vec<u8>> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        self.post(
            url,
            encoded.into_bytes(),
            ContentType::FormUrlEncoded,
            additional_headers,
        )
        .await
    }
}

/// [`LibraryNetworking`] on top of any [`HttpClient`].
pub struct WalletLibraryNetworking<H: HttpClient> {
    http_client: H,
    logger: WalletLibraryLogger,
    correlation_header: Option<Arc<dyn CorrelationHeader>>,
}

impl<H: HttpClient> WalletLibraryNetworking<H> {
    pub fn new(
        http_client: H,
        logger: WalletLibraryLogger,
        correlation_header: Option<Arc<dyn CorrelationHeader>>,
    ) -> Self {
        Self {
            http_client,
            logger,
            correlation_header,
        }
    }

    fn current_correlation_id(&self) -> Option<String> {
        self.correlation_header
            .as_ref()
            .map(|correlation| correlation.value())
    }

    fn headers(&self, additional_headers: &[(String, String)]) -> Headers {
        let mut headers: Headers = additional_headers.to_vec();
        if let Some(correlation) = &self.correlation_header {
            headers.push((correlation.name().to_string(), correlation.value()));
        }
        headers
    }

    fn handle_response(&self, url: &Url, response: HttpResponse) -> Result<Vec<u8>> {
        if response.is_success() {
            return Ok(response.body);
        }

        let error = map_status_to_error(&response);
        self.logger.error(
            &format!(
                "Networking Error: {} returned {} ({})",
                url, response.status, error.message
            ),
            call_site!(),
        );
        Err(error.with_correlation_id(self.current_correlation_id()))
    }

    fn transport_error(&self, url: &Url, err: anyhow::Error) -> VerifiedIdError {
        self.logger
            .error(&format!("Unable to reach {}: {}", url, err), call_site!());
        VerifiedIdError::networking(
            "Unable to reach endpoint.",
            None,
            Some(err.to_string()),
            true,
        )
        .with_correlation_id(self.current_correlation_id())
    }
}

#[async_trait]
impl<H: HttpClient + 'static> LibraryNetworking for WalletLibraryNetworking<H> {
    fn reset_correlation_header(&self) {
        if let Some(correlation) = &self.correlation_header {
            correlation.reset();
        }
    }

    fn correlation_id(&self) -> Option<String> {
        self.current_correlation_id()
    }

    async fn fetch(&self, url: &Url, additional_headers: &[(String, String)]) -> Result<Vec<u8>> {
        let headers = self.headers(additional_headers);
        log::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.as_str(), &headers)
            .await
            .map_err(|e| self.transport_error(url, e))?;

        self.handle_response(url, response)
    }

    async fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: ContentType,
        additional_headers: &[(String, String)],
    ) -> Result<Vec<u8>> {
        let mut headers = self.headers(additional_headers);
        headers.push((
            CONTENT_TYPE_HEADER.to_string(),
            content_type.as_str().to_string(),
        ));
        log::debug!("POST {}", url);

        let response = self
            .http_client
            .post(url.as_str(), body, &headers)
            .await
            .map_err(|e| self.transport_error(url, e))?;

        self.handle_response(url, response)
    }
}

fn map_status_to_error(response: &HttpResponse) -> VerifiedIdError {
    let (message, retryable) = match response.status {
        400 => ("Bad Request", false),
        401 => ("Unauthorized", false),
        403 => ("Forbidden", false),
        404 => ("Not Found", false),
        500..=599 => ("Server Error", true),
        _ => ("Unknown Networking Error", false),
    };

    let body = String::from_utf8_lossy(&response.body).into_owned();
    VerifiedIdError::networking(message, Some(response.status), Some(body), retryable)
}
