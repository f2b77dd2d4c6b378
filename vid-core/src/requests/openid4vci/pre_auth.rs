use std::sync::Arc;

use url::Url;

use super::models::{AccessTokenResponse, CredentialOfferGrant, OpenIdWellKnownConfiguration};
use crate::configuration::LibraryConfiguration;
use crate::constants::{OPENID_CONFIGURATION_PATH, PRE_AUTHORIZED_CODE_GRANT};
use crate::error::{Result, VerifiedIdError};
use crate::wallet_log;

/// Redeems pre-authorized codes at the grant's authorization server.
pub struct PreAuthTokenResolver {
    configuration: Arc<LibraryConfiguration>,
}

impl PreAuthTokenResolver {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self { configuration }
    }

    pub async fn resolve_access_token(
        &self,
        grant: &CredentialOfferGrant,
        tx_code: Option<&str>,
    ) -> Result<String> {
        let pre_authorized_code = grant
            .pre_authorized_code
            .as_deref()
            .ok_or_else(|| VerifiedIdError::pre_auth("Missing pre-authorized code in grant."))?;
        let authorization_server = grant.authorization_server.as_deref().ok_or_else(|| {
            VerifiedIdError::pre_auth("Missing authorization server in grant.")
        })?;

        let well_known = well_known_url(authorization_server)?;
        let configuration: OpenIdWellKnownConfiguration = self
            .configuration
            .networking
            .fetch_json(&well_known, &[])
            .await?;

        let supported = configuration
            .grant_types_supported
            .iter()
            .flatten()
            .any(|grant_type| grant_type == PRE_AUTHORIZED_CODE_GRANT);
        if !supported {
            return Err(VerifiedIdError::pre_auth(
                "Grant type not included in well-known configuration.",
            ));
        }

        let token_endpoint = configuration.token_endpoint.as_deref().ok_or_else(|| {
            VerifiedIdError::pre_auth("Missing token endpoint in well-known configuration.")
        })?;
        let token_endpoint = Url::parse(token_endpoint)?;

        let mut fields = vec![
            ("grant_type", PRE_AUTHORIZED_CODE_GRANT),
            ("pre-authorized_code", pre_authorized_code),
        ];
        if let Some(tx_code) = tx_code {
            fields.push(("tx_code", tx_code));
        }

        let body = self
            .configuration
            .networking
            .post_form(&token_endpoint, &fields, &[])
            .await?;
        let response: AccessTokenResponse = serde_json::from_slice(&body)?;

        wallet_log!(
            self.configuration.logger,
            Debug,
            "pre-authorized code redeemed at {}",
            token_endpoint
        );
        response
            .access_token
            .ok_or_else(|| VerifiedIdError::pre_auth("Missing access token in token response."))
    }
}

fn well_known_url(authorization_server: &str) -> Result<Url> {
    let server = authorization_server.trim_end_matches('/');
    if server.ends_with(OPENID_CONFIGURATION_PATH) {
        return Ok(Url::parse(server)?);
    }
    Ok(Url::parse(&format!("{}{}", server, OPENID_CONFIGURATION_PATH))?)
}
