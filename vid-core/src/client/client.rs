use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{RequestProcessorFactory, RequestResolverFactory};
use crate::configuration::LibraryConfiguration;
use crate::constants::{
    JWT_TYPE, SELF_SIGNED_LIFETIME_SECONDS, VC_CONTEXT, VERIFIABLE_CREDENTIAL_TYPE,
};
use crate::error::{Result, VerifiedIdError};
use crate::requests::{VerifiedIdRequest, VerifiedIdRequestInput};
use crate::styles::VerifiedIdStyle;
use crate::token::validation::now_seconds;
use crate::token::{Header, JwsToken};
use crate::verified_id::{
    VcClaims, VcDescriptor, VerifiableCredential, VerifiedId, VerifiedIdClaim, VerifiedIdEncoder,
};
use crate::wallet_log;

/// Entry point for hosts: turns request inputs into requests and manages
/// the Verified IDs the holder keeps.
///
/// Built with [`VerifiedIdClientBuilder`](super::VerifiedIdClientBuilder).
pub struct VerifiedIdClient {
    configuration: Arc<LibraryConfiguration>,
    resolver_factory: RequestResolverFactory,
    processor_factory: RequestProcessorFactory,
}

impl VerifiedIdClient {
    pub(crate) fn new(
        configuration: Arc<LibraryConfiguration>,
        resolver_factory: RequestResolverFactory,
        processor_factory: RequestProcessorFactory,
    ) -> Self {
        Self {
            configuration,
            resolver_factory,
            processor_factory,
        }
    }

    pub fn configuration(&self) -> &LibraryConfiguration {
        &self.configuration
    }

    /// Resolve and process `input`.
    ///
    /// Each call starts a new correlation; errors carry its id.
    pub async fn create_request(&self, input: &VerifiedIdRequestInput) -> Result<VerifiedIdRequest> {
        let networking = &self.configuration.networking;
        networking.reset_correlation_header();

        self.resolve_and_process(input)
            .await
            .map_err(|err| err.with_correlation_id(networking.correlation_id()))
    }

    async fn resolve_and_process(&self, input: &VerifiedIdRequestInput) -> Result<VerifiedIdRequest> {
        let resolver = self.resolver_factory.make_resolver(input)?;
        let raw_request = resolver.resolve(input).await?;

        let processor = self.processor_factory.make_processor(&raw_request)?;
        let request = processor.process(raw_request).await?;
        wallet_log!(self.configuration.logger, Debug, "created {:?}", request);
        Ok(request)
    }

    pub fn encode(&self, verified_id: &VerifiedId) -> Result<Vec<u8>> {
        VerifiedIdEncoder::encode(verified_id).map_err(VerifiedIdError::malformed_input_from)
    }

    pub fn decode(&self, raw: &[u8]) -> Result<VerifiedId> {
        VerifiedIdEncoder::decode(raw).map_err(VerifiedIdError::malformed_input_from)
    }

    /// Claims of `verified_id` labelled in the configured preferred languages.
    pub fn claims(&self, verified_id: &VerifiedId) -> Vec<VerifiedIdClaim> {
        verified_id.localized_claims(&self.configuration.preferred_languages)
    }

    /// Card style of `verified_id` in the configured preferred languages.
    pub fn style(&self, verified_id: &VerifiedId) -> VerifiedIdStyle {
        verified_id.localized_style(&self.configuration.preferred_languages)
    }

    /// Issue a Verified ID to the holder, signed by the holder.
    pub fn create_self_signed_verified_id(
        &self,
        claims: Map<String, Value>,
        types: Vec<String>,
    ) -> Result<VerifiedId> {
        let identifier = self
            .configuration
            .identifier_manager
            .fetch_or_create_master_identifier()
            .map_err(VerifiedIdError::self_signed_creation)?;
        let key = identifier.signing_key()?;

        let iat = now_seconds();
        let mut all_types = vec![VERIFIABLE_CREDENTIAL_TYPE.to_string()];
        all_types.extend(types);
        let vc_claims = VcClaims {
            jti: Some(format!("urn:pic:{}", Uuid::new_v4().simple())),
            iss: Some(identifier.did.clone()),
            sub: Some(identifier.did.clone()),
            iat: Some(iat),
            exp: Some(iat + SELF_SIGNED_LIFETIME_SECONDS),
            vc: VcDescriptor {
                context: vec![VC_CONTEXT.to_string()],
                types: all_types,
                credential_subject: claims,
            },
        };

        let mut token = JwsToken::new(
            Header::es256k(JWT_TYPE, identifier.key_reference(key)),
            vc_claims,
        )
        .map_err(VerifiedIdError::self_signed_creation)?;
        token.sign(key);

        let vc = VerifiableCredential::parse(&token.serialize())
            .map_err(VerifiedIdError::self_signed_creation)?;
        Ok(VerifiedId::SelfSigned { vc })
    }
}
