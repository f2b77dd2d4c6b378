use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::presentation::validate_presentation_request;
use super::{RawRequest, RequestResolving, VerifiedIdRequestInput};
use crate::configuration::LibraryConfiguration;
use crate::constants::{CREDENTIAL_OFFER_URI_QUERY_ITEM, OPENID_SCHEME, REQUEST_URI_QUERY_ITEM};
use crate::error::{Result, VerifiedIdError};
use crate::wallet_log;

/// Resolves `openid-vc://` urls by fetching the request they point at.
pub struct OpenIdUrlRequestResolver {
    configuration: Arc<LibraryConfiguration>,
}

impl OpenIdUrlRequestResolver {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self { configuration }
    }
}

fn request_uri(url: &Url) -> Result<Url> {
    let value = url
        .query_pairs()
        .find(|(name, _)| name == REQUEST_URI_QUERY_ITEM || name == CREDENTIAL_OFFER_URI_QUERY_ITEM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            VerifiedIdError::malformed_input(format!(
                "Unable to find {} or {} in url.",
                REQUEST_URI_QUERY_ITEM, CREDENTIAL_OFFER_URI_QUERY_ITEM
            ))
        })?;
    Ok(Url::parse(&value)?)
}

#[async_trait]
impl RequestResolving for OpenIdUrlRequestResolver {
    fn can_resolve(&self, input: &VerifiedIdRequestInput) -> bool {
        match input {
            VerifiedIdRequestInput::Url(url) => url.scheme() == OPENID_SCHEME,
        }
    }

    async fn resolve(&self, input: &VerifiedIdRequestInput) -> Result<RawRequest> {
        let VerifiedIdRequestInput::Url(url) = input;
        let request_uri = request_uri(url)?;
        wallet_log!(
            self.configuration.logger,
            Debug,
            "fetching request from {}",
            request_uri
        );

        let body = self
            .configuration
            .networking
            .fetch(&request_uri, &self.configuration.prefer_headers)
            .await?;

        if let Ok(value @ Value::Object(_)) = serde_json::from_slice::<Value>(&body) {
            return Ok(RawRequest::CredentialOffer(value));
        }

        let raw = String::from_utf8(body).map_err(VerifiedIdError::malformed_input_from)?;
        let (token, root_of_trust) =
            validate_presentation_request(&self.configuration, raw.trim()).await?;
        Ok(RawRequest::PresentationRequest {
            token,
            root_of_trust,
        })
    }
}
