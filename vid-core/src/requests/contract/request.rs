use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::models::{
    IssuanceCompletionDetails, IssuanceCompletionResponse, IssuedCredentialResponse,
};
use super::resolver::ResolvedContract;
use super::IssuanceResponseContainer;
use crate::configuration::LibraryConfiguration;
use crate::error::{codes, Result, VerifiedIdError};
use crate::networking::ContentType;
use crate::requests::VerifiedIdIssuanceRequest;
use crate::requirements::Requirement;
use crate::root_of_trust::RootOfTrust;
use crate::styles::{RequesterStyle, VerifiedIdStyle};
use crate::verified_id::{VerifiableCredential, VerifiedId};
use crate::wallet_log;

/// Report how issuance ended to the requester. Failures are only logged.
pub(crate) async fn send_issuance_result(
    configuration: &LibraryConfiguration,
    callback_url: &Url,
    result: &IssuanceCompletionResponse,
) {
    let sent = configuration
        .networking
        .post(
            callback_url,
            serde_json::to_vec(result).unwrap_or_default(),
            ContentType::Json,
            &[],
        )
        .await;
    if let Err(err) = sent {
        wallet_log!(
            configuration.logger,
            Error,
            "Unable to send Issuance Result to callback. Error: {}",
            err
        );
    }
}

/// Issuance of a Verified ID described by a contract.
pub struct ContractIssuanceRequest {
    style: RequesterStyle,
    verified_id_style: VerifiedIdStyle,
    requirement: Requirement,
    root_of_trust: RootOfTrust,
    contract: ResolvedContract,
    request_state: String,
    callback_url: Url,
    configuration: Arc<LibraryConfiguration>,
}

impl ContractIssuanceRequest {
    pub(crate) fn new(
        requirement: Requirement,
        contract: ResolvedContract,
        request_state: String,
        callback_url: Url,
        configuration: Arc<LibraryConfiguration>,
    ) -> Self {
        Self {
            style: contract.claims.display.issuer_style(),
            verified_id_style: contract.claims.display.verified_id_style(),
            requirement,
            root_of_trust: contract.root_of_trust.clone(),
            contract,
            request_state,
            callback_url,
            configuration,
        }
    }

    pub fn contract(&self) -> &ResolvedContract {
        &self.contract
    }

    async fn send_response(&self) -> Result<VerifiedId> {
        self.requirement.validate()?;

        let input = &self.contract.claims.input;
        let mut container =
            IssuanceResponseContainer::new(&input.credential_issuer, self.contract.url.as_str());
        container.add(&self.requirement)?;

        let identifier = self
            .configuration
            .identifier_manager
            .fetch_or_create_master_identifier()?;
        let response = container.sign(&identifier)?;

        let credential_issuer = Url::parse(&input.credential_issuer)?;
        let body = self
            .configuration
            .networking
            .post(
                &credential_issuer,
                response.into_bytes(),
                ContentType::Jwt,
                &self.configuration.prefer_headers,
            )
            .await?;
        let issued: IssuedCredentialResponse = serde_json::from_slice(&body)?;

        Ok(VerifiedId::Contract {
            vc: VerifiableCredential::parse(&issued.vc)?,
            display: self.contract.claims.display.clone(),
        })
    }
}

#[async_trait]
impl VerifiedIdIssuanceRequest for ContractIssuanceRequest {
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
        match self.send_response().await {
            Ok(verified_id) => {
                let result = IssuanceCompletionResponse::succeeded(&self.request_state);
                send_issuance_result(&self.configuration, &self.callback_url, &result).await;
                wallet_log!(
                    self.configuration.logger,
                    Info,
                    "contract issuance of {} completed",
                    self.verified_id_style.name
                );
                Ok(verified_id)
            }
            // unmet requirements can still be fixed by the holder
            Err(err) if err.code == codes::REQUIREMENT_NOT_MET => Err(err),
            Err(err) => {
                let result = IssuanceCompletionResponse::failed(
                    &self.request_state,
                    IssuanceCompletionDetails::IssuanceServiceError,
                );
                send_issuance_result(&self.configuration, &self.callback_url, &result).await;
                Err(err)
            }
        }
    }

    async fn cancel(&self, message: Option<String>) -> Result<()> {
        let result = IssuanceCompletionResponse::failed(
            &self.request_state,
            IssuanceCompletionDetails::UserCanceled,
        );
        send_issuance_result(&self.configuration, &self.callback_url, &result).await;
        Err(VerifiedIdError::user_canceled(message))
    }
}
