use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::models::PresentationRequestClaims;
use super::PresentationExchangeSerializer;
use crate::configuration::LibraryConfiguration;
use crate::error::{required, Result, VerifiedIdError};
use crate::requests::VerifiedIdPresentationRequest;
use crate::requirements::Requirement;
use crate::root_of_trust::RootOfTrust;
use crate::styles::RequesterStyle;
use crate::wallet_log;

pub struct OpenIdPresentationRequest {
    style: RequesterStyle,
    requirement: Requirement,
    root_of_trust: RootOfTrust,
    claims: PresentationRequestClaims,
    configuration: Arc<LibraryConfiguration>,
}

impl OpenIdPresentationRequest {
    pub(crate) fn new(
        style: RequesterStyle,
        requirement: Requirement,
        root_of_trust: RootOfTrust,
        claims: PresentationRequestClaims,
        configuration: Arc<LibraryConfiguration>,
    ) -> Self {
        Self {
            style,
            requirement,
            root_of_trust,
            claims,
            configuration,
        }
    }

    pub fn claims(&self) -> &PresentationRequestClaims {
        &self.claims
    }
}

#[async_trait]
impl VerifiedIdPresentationRequest for OpenIdPresentationRequest {
    fn style(&self) -> &RequesterStyle {
        &self.style
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

    async fn complete(&self) -> Result<()> {
        self.requirement.validate()?;

        let identifier = self
            .configuration
            .identifier_manager
            .fetch_or_create_master_identifier()?;
        let mut serializer = PresentationExchangeSerializer::new(&self.claims, identifier)?;

        let mut presentable = Vec::new();
        self.requirement.presentable(&mut presentable)?;
        for requirement in presentable {
            serializer.add(requirement)?;
        }
        let response = serializer.serialize()?;

        let redirect_uri = required(
            self.claims.redirect_uri.as_deref(),
            "redirect_uri",
            "PresentationRequest",
        )?;
        let url = Url::parse(redirect_uri)?;

        let vp_token = response.vp_token_parameter()?;
        let mut fields = vec![("id_token", response.id_token.as_str())];
        if let Some(vp_token) = vp_token.as_deref() {
            fields.push(("vp_token", vp_token));
        }
        fields.push(("state", response.state.as_str()));

        self.configuration
            .networking
            .post_form(&url, &fields, &[])
            .await?;
        wallet_log!(
            self.configuration.logger,
            Info,
            "presentation response sent with {} presentation(s)",
            response.vp_tokens.len()
        );
        Ok(())
    }

    async fn cancel(&self, message: Option<String>) -> Result<()> {
        Err(VerifiedIdError::user_canceled(message))
    }
}
