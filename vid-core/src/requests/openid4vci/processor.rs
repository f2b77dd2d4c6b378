use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::models::{CredentialMetadata, CredentialOffer, CredentialOfferGrant};
use super::{OpenId4VciRequest, PreAuthTokenResolver, SignedMetadataProcessor};
use crate::configuration::LibraryConfiguration;
use crate::constants::{
    AUTHORIZATION_CODE_GRANT, CREDENTIAL_ISSUER_METADATA_PATH, PRE_AUTHORIZED_CODE_GRANT,
};
use crate::error::{required, Result, VerifiedIdError};
use crate::requests::{RawRequest, RequestProcessing, VerifiedIdRequest};
use crate::requirements::{
    AccessTokenRequirement, PrefilledAccessTokenRequirement, Requirement, RetryablePinRequirement,
};
use crate::wallet_log;

/// Turns OpenID4VCI credential offers into issuance requests.
pub struct OpenId4VciProcessor {
    configuration: Arc<LibraryConfiguration>,
    pre_auth: Arc<PreAuthTokenResolver>,
}

impl OpenId4VciProcessor {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self {
            pre_auth: Arc::new(PreAuthTokenResolver::new(configuration.clone())),
            configuration,
        }
    }

    async fn fetch_metadata(&self, credential_issuer: &str) -> Result<CredentialMetadata> {
        let url = Url::parse(&format!(
            "{}{}",
            credential_issuer.trim_end_matches('/'),
            CREDENTIAL_ISSUER_METADATA_PATH
        ))?;
        self.configuration
            .networking
            .fetch_json(&url, &self.configuration.prefer_headers)
            .await
    }

    async fn requirement(
        &self,
        offer: &CredentialOffer,
        configuration_id: &str,
        scope: Option<&str>,
    ) -> Result<Requirement> {
        let mut requirements = Vec::new();
        for (grant_type, grant) in &offer.grants {
            match grant_type.as_str() {
                AUTHORIZATION_CODE_GRANT => {
                    let scope = scope.ok_or_else(|| {
                        VerifiedIdError::malformed_credential_metadata(
                            "Credential Configuration does not contain scope value.",
                        )
                    })?;
                    requirements.push(Requirement::AccessToken(AccessTokenRequirement::new(
                        configuration_id,
                        scope,
                        format!("{}/.default", scope),
                    )));
                }
                PRE_AUTHORIZED_CODE_GRANT => {
                    requirements.push(self.pre_authorized_requirement(grant).await?);
                }
                other => {
                    wallet_log!(self.configuration.logger, Debug, "ignoring grant {}", other);
                }
            }
        }
        Requirement::reduce(requirements)
    }

    async fn pre_authorized_requirement(
        &self,
        grant: &CredentialOfferGrant,
    ) -> Result<Requirement> {
        if grant.tx_code.is_some() {
            return Ok(Requirement::RetryablePin(RetryablePinRequirement::new(
                grant.clone(),
                self.pre_auth.clone(),
            )));
        }

        let access_token = self.pre_auth.resolve_access_token(grant, None).await?;
        Ok(Requirement::PrefilledAccessToken(
            PrefilledAccessTokenRequirement::new(access_token),
        ))
    }
}

#[async_trait]
impl RequestProcessing for OpenId4VciProcessor {
    fn can_process(&self, raw_request: &RawRequest) -> bool {
        match raw_request {
            RawRequest::CredentialOffer(value) => CredentialOffer::parse(value).is_some(),
            _ => false,
        }
    }

    async fn process(&self, raw_request: RawRequest) -> Result<VerifiedIdRequest> {
        let offer = match &raw_request {
            RawRequest::CredentialOffer(value) => parse_offer(value)?,
            _ => return Err(VerifiedIdError::unsupported_raw_request()),
        };

        let metadata = self.fetch_metadata(&offer.credential_issuer).await?;
        let credential_configuration = metadata
            .credential_configuration(&offer.credential_configuration_ids)?
            .clone();
        metadata.validate_authorization_servers(&offer)?;

        let signed_metadata = required(
            metadata.signed_metadata.as_deref(),
            "signed_metadata",
            "CredentialMetadata",
        )?;
        let credential_issuer = required(
            metadata.credential_issuer.as_deref(),
            "credential_issuer",
            "CredentialMetadata",
        )?;
        let root_of_trust = SignedMetadataProcessor::new(self.configuration.clone())
            .process(signed_metadata, credential_issuer)
            .await?;

        let preferred = &self.configuration.preferred_languages;
        let style = metadata.requester_style(preferred);
        let verified_id_style = credential_configuration.style(&style.name, preferred);

        let configuration_id = offer
            .credential_configuration_ids
            .first()
            .cloned()
            .unwrap_or_default();
        let requirement = self
            .requirement(
                &offer,
                &configuration_id,
                credential_configuration.scope.as_deref(),
            )
            .await?;

        wallet_log!(
            self.configuration.logger,
            Info,
            "credential offer from {} processed",
            offer.credential_issuer
        );

        Ok(VerifiedIdRequest::Issuance(Box::new(OpenId4VciRequest::new(
            style,
            verified_id_style,
            requirement,
            root_of_trust,
            offer,
            metadata,
            credential_configuration,
            self.configuration.clone(),
        ))))
    }
}

fn parse_offer(value: &Value) -> Result<CredentialOffer> {
    CredentialOffer::parse(value).ok_or_else(|| {
        VerifiedIdError::malformed_credential_offer("Credential Offer is malformed.")
    })
}
