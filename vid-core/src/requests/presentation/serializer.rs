use uuid::Uuid;

use super::models::{
    IdTokenClaims, InputDescriptorMapping, NestedInputDescriptorMapping, PresentationRequestClaims,
    PresentationSubmission, VerifiablePresentationDescriptor, VpClaims, VpTokenDescription,
};
use crate::constants::{
    JWT_TYPE, PRESENTATION_RESPONSE_LIFETIME_SECONDS, VC_CONTEXT, VERIFIABLE_PRESENTATION_TYPE,
};
use crate::error::{required, Result, VerifiedIdError};
use crate::identifier::HolderIdentifier;
use crate::requirements::VerifiedIdRequirement;
use crate::token::validation::now_seconds;
use crate::token::{Header, JwsToken};

const VP_FORMAT: &str = "jwt_vp";
const VC_FORMAT: &str = "jwt_vc";

/// Signed tokens ready to be posted to the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationResponse {
    pub id_token: String,
    pub vp_tokens: Vec<String>,
    pub state: String,
}

impl PresentationResponse {
    /// The `vp_token` form value: the token itself, or a JSON array when
    /// there are several.
    pub fn vp_token_parameter(&self) -> Result<Option<String>> {
        match self.vp_tokens.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(single.clone())),
            many => Ok(Some(serde_json::to_string(many)?)),
        }
    }
}

#[derive(Debug, Clone)]
struct PresentationEntry {
    requirement: VerifiedIdRequirement,
    input_descriptor_id: String,
    raw_vc: String,
}

#[derive(Debug, Default)]
struct VerifiablePresentationBuilder {
    entries: Vec<PresentationEntry>,
}

impl VerifiablePresentationBuilder {
    fn accepts(&self, requirement: &VerifiedIdRequirement) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.requirement.can_share_presentation_with(requirement))
    }
}

/// Builds the id_token and verifiable presentations answering a
/// presentation exchange request.
#[derive(Debug)]
pub struct PresentationExchangeSerializer {
    state: String,
    audience: String,
    nonce: String,
    definition_id: String,
    identifier: HolderIdentifier,
    builders: Vec<VerifiablePresentationBuilder>,
}

impl PresentationExchangeSerializer {
    pub fn new(claims: &PresentationRequestClaims, identifier: HolderIdentifier) -> Result<Self> {
        let (Some(state), Some(audience), Some(nonce), Some(definition_id)) = (
            claims.state.clone(),
            claims.client_id.clone(),
            claims.nonce.clone(),
            claims.definition_id().map(str::to_string),
        ) else {
            return Err(VerifiedIdError::missing_required_property(
                "Unable to create serializer.",
            ));
        };

        Ok(Self {
            state,
            audience,
            nonce,
            definition_id,
            identifier,
            builders: Vec::new(),
        })
    }

    /// Place the selected Verified ID of `requirement` in the first
    /// presentation it may share.
    pub fn add(&mut self, requirement: &VerifiedIdRequirement) -> Result<()> {
        let verified_id = requirement.selected_verified_id().ok_or_else(|| {
            VerifiedIdError::requirement_not_met("Verified Id has not been set.", vec![])
        })?;
        let input_descriptor_id = required(requirement.id.clone(), "id", "InputDescriptor")?;

        let entry = PresentationEntry {
            requirement: requirement.clone(),
            input_descriptor_id,
            raw_vc: verified_id.raw().to_string(),
        };

        match self
            .builders
            .iter_mut()
            .find(|builder| builder.accepts(requirement))
        {
            Some(builder) => builder.entries.push(entry),
            None => self.builders.push(VerifiablePresentationBuilder {
                entries: vec![entry],
            }),
        }
        Ok(())
    }

    pub fn serialize(&self) -> Result<PresentationResponse> {
        let key = self.identifier.signing_key()?;
        let header = Header::es256k(JWT_TYPE, self.identifier.key_reference(key));
        let iat = now_seconds();
        let exp = iat + PRESENTATION_RESPONSE_LIFETIME_SECONDS;

        let id_token_claims = IdTokenClaims {
            sub: self.identifier.did.clone(),
            aud: self.audience.clone(),
            nonce: self.nonce.clone(),
            iat,
            exp,
            vp_token: vec![VpTokenDescription {
                presentation_submission: PresentationSubmission {
                    id: Uuid::new_v4().to_string(),
                    definition_id: self.definition_id.clone(),
                    descriptor_map: self.descriptor_map(),
                },
            }],
        };
        let mut id_token = JwsToken::new(header.clone(), id_token_claims)?;
        id_token.sign(key);

        let vp_tokens = self
            .builders
            .iter()
            .map(|builder| -> Result<String> {
                let claims = VpClaims {
                    jti: Uuid::new_v4().to_string(),
                    vp: VerifiablePresentationDescriptor {
                        context: vec![VC_CONTEXT.to_string()],
                        types: vec![VERIFIABLE_PRESENTATION_TYPE.to_string()],
                        verifiable_credential: builder
                            .entries
                            .iter()
                            .map(|entry| entry.raw_vc.clone())
                            .collect(),
                    },
                    iss: self.identifier.did.clone(),
                    aud: self.audience.clone(),
                    iat,
                    nbf: iat,
                    exp,
                    nonce: self.nonce.clone(),
                };
                let mut token = JwsToken::new(header.clone(), claims)?;
                token.sign(key);
                Ok(token.serialize())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PresentationResponse {
            id_token: id_token.serialize(),
            vp_tokens,
            state: self.state.clone(),
        })
    }

    fn descriptor_map(&self) -> Vec<InputDescriptorMapping> {
        self.builders
            .iter()
            .enumerate()
            .flat_map(|(vp_index, builder)| {
                builder
                    .entries
                    .iter()
                    .enumerate()
                    .map(move |(vc_index, entry)| InputDescriptorMapping {
                        id: entry.input_descriptor_id.clone(),
                        format: VP_FORMAT.to_string(),
                        path: format!("$[{}]", vp_index),
                        path_nested: NestedInputDescriptorMapping {
                            id: entry.input_descriptor_id.clone(),
                            format: VC_FORMAT.to_string(),
                            path: format!("$[{}].verifiableCredential[{}]", vp_index, vc_index),
                        },
                    })
            })
            .collect()
    }
}
