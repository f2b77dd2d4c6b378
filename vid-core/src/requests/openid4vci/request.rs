use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::credential_request::format_credential_request;
use super::models::{
    CredentialCompletionRequest, CredentialConfiguration, CredentialMetadata, CredentialOffer,
    CredentialResponse,
};
use crate::configuration::LibraryConfiguration;
use crate::error::{required, Result, VerifiedIdError};
use crate::networking::ContentType;
use crate::requests::VerifiedIdIssuanceRequest;
use crate::requirements::Requirement;
use crate::root_of_trust::RootOfTrust;
use crate::styles::{RequesterStyle, VerifiedIdStyle};
use crate::verified_id::{VerifiableCredential, VerifiedId};
use crate::wallet_log;

const COMPLETED_STATE: &str = "completed";
const ISSUED_CODE: &str = "issued";

/// An issuance request built from an OpenID4VCI credential offer.
pub struct OpenId4VciRequest {
    style: RequesterStyle,
    verified_id_style: VerifiedIdStyle,
    requirement: Requirement,
    root_of_trust: RootOfTrust,
    offer: CredentialOffer,
    metadata: CredentialMetadata,
    credential_configuration: CredentialConfiguration,
    configuration: Arc<LibraryConfiguration>,
}

impl OpenId4VciRequest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        style: RequesterStyle,
        verified_id_style: VerifiedIdStyle,
        requirement: Requirement,
        root_of_trust: RootOfTrust,
        offer: CredentialOffer,
        metadata: CredentialMetadata,
        credential_configuration: CredentialConfiguration,
        configuration: Arc<LibraryConfiguration>,
    ) -> Self {
        Self {
            style,
            verified_id_style,
            requirement,
            root_of_trust,
            offer,
            metadata,
            credential_configuration,
            configuration,
        }
    }

    pub fn offer(&self) -> &CredentialOffer {
        &self.offer
    }

    fn headers(&self, access_token: &str) -> Vec<(String, String)> {
        let mut headers = self.configuration.prefer_headers.clone();
        headers.push((
            "Authorization".to_string(),
            format!("Bearer {}", access_token),
        ));
        headers
    }

    async fn send_notification(&self, headers: &[(String, String)]) -> Result<()> {
        let Some(endpoint) = self.metadata.notification_endpoint.as_deref() else {
            return Ok(());
        };
        let body = serde_json::to_vec(&CredentialCompletionRequest {
            issuer_session: self.offer.issuer_session.clone(),
            state: COMPLETED_STATE.to_string(),
            code: ISSUED_CODE.to_string(),
        })?;
        self.configuration
            .networking
            .post(&Url::parse(endpoint)?, body, ContentType::Json, headers)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VerifiedIdIssuanceRequest for OpenId4VciRequest {
    fn style(&self) -> &RequesterStyle {
        &self.style
    }

    fn verified_id_style(&self) -> &VerifiedIdStyle {
        &self.verified_id_style
    }

    fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    fn requirement_mut(&mut self) -> &mut Requirement {
        &mut self.requirement
    }

    fn root_of_trust(&self) -> &RootOfTrust {
        &self.root_of_trust
    }

    async fn complete(&self) -> Result<VerifiedId> {
        let access_token = self.requirement.access_token().ok_or_else(|| {
            VerifiedIdError::requirement_not_met("Access token has not been set.", vec![])
        })?;

        let identifier = self
            .configuration
            .identifier_manager
            .fetch_or_create_master_identifier()?;
        let request =
            format_credential_request(&self.offer, &self.metadata, access_token, &identifier)?;

        let endpoint = required(
            self.metadata.credential_endpoint.as_deref(),
            "credential_endpoint",
            "CredentialMetadata",
        )?;
        let headers = self.headers(access_token);
        let response: CredentialResponse = self
            .configuration
            .networking
            .post_json(&Url::parse(endpoint)?, &request, &headers)
            .await?;

        let raw = response.first_credential().ok_or_else(|| {
            VerifiedIdError::request_creation("Credential not present in Credential Response.")
        })?;
        let vc = VerifiableCredential::parse(&raw)?;
        required(vc.claims().jti.as_deref(), "jti", "VerifiableCredential")?;
        required(vc.claims().iat, "iat", "VerifiableCredential")?;

        let verified_id = VerifiedId::OpenId4Vci {
            vc,
            configuration: self.credential_configuration.clone(),
            issuer_name: self.style.name.clone(),
        };

        if let Err(error) = self.send_notification(&headers).await {
            wallet_log!(
                self.configuration.logger,
                Warn,
                "unable to send issuance notification: {}",
                error
            );
        }

        wallet_log!(
            self.configuration.logger,
            Info,
            "issued Verified ID {}",
            verified_id.id()
        );
        Ok(verified_id)
    }

    async fn cancel(&self, message: Option<String>) -> Result<()> {
        Err(VerifiedIdError::user_canceled(message))
    }
}
