use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use super::models::{AttestationsResponse, IssuanceResponseClaims};
use crate::constants::{
    ISSUANCE_RESPONSE_LIFETIME_SECONDS, JWT_TYPE, VC_CONTEXT, VERIFIABLE_PRESENTATION_TYPE,
};
use crate::error::{Result, VerifiedIdError};
use crate::identifier::HolderIdentifier;
use crate::nonce::NonceCreator;
use crate::requests::presentation::{VerifiablePresentationDescriptor, VpClaims};
use crate::requirements::{PinRequirement, Requirement, VerifiedIdRequirement};
use crate::token::validation::now_seconds;
use crate::token::{Header, JwsToken};

/// Collects fulfilled requirements into the response posted to the
/// contract's credential issuer.
#[derive(Debug, Clone)]
pub struct IssuanceResponseContainer {
    audience: String,
    contract_url: String,
    attestations: AttestationsResponse,
    /// Raw VC JWTs keyed by credential type, wrapped in presentations on sign.
    presentations: Vec<(String, String)>,
    pin: Option<String>,
}

impl IssuanceResponseContainer {
    pub fn new(audience: impl Into<String>, contract_url: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            contract_url: contract_url.into(),
            attestations: AttestationsResponse::default(),
            presentations: Vec::new(),
            pin: None,
        }
    }

    /// Add `requirement` and, for groups, every valid child.
    pub fn add(&mut self, requirement: &Requirement) -> Result<()> {
        requirement.validate()?;
        match requirement {
            Requirement::Group(group) => {
                for child in group.requirements.iter().filter(|child| child.is_valid()) {
                    self.add(child)?;
                }
            }
            Requirement::IdToken(id_token) => {
                if let Some(token) = id_token.id_token() {
                    self.attestations
                        .id_tokens
                        .insert(id_token.configuration.clone(), token.to_string());
                }
            }
            Requirement::AccessToken(access_token) => {
                if let Some(token) = access_token.access_token() {
                    self.attestations
                        .access_tokens
                        .insert(access_token.configuration.clone(), token.to_string());
                }
            }
            Requirement::SelfAttestedClaim(claim) => {
                if let Some(value) = claim.value() {
                    self.attestations
                        .self_issued
                        .insert(claim.claim.clone(), value.to_string());
                }
            }
            Requirement::Pin(pin) => self.pin = hashed_pin(pin),
            Requirement::VerifiedId(verified_id) => self.add_verified_id(verified_id)?,
            Requirement::PrefilledAccessToken(_) | Requirement::RetryablePin(_) => {
                return Err(VerifiedIdError::request_creation(
                    "Requirement is not supported in a contract issuance response.",
                ))
            }
        }
        Ok(())
    }

    fn add_verified_id(&mut self, requirement: &VerifiedIdRequirement) -> Result<()> {
        let selected = requirement.selected_verified_id().ok_or_else(|| {
            VerifiedIdError::requirement_not_met("Verified Id has not been set.", vec![])
        })?;
        let credential_type = requirement
            .id
            .clone()
            .or_else(|| requirement.types.first().cloned())
            .unwrap_or_default();
        self.presentations
            .push((credential_type, selected.raw().to_string()));
        Ok(())
    }

    /// Sign the response with the holder's signing key.
    pub fn sign(&self, identifier: &HolderIdentifier) -> Result<String> {
        let key = identifier.signing_key()?;
        let header = Header::es256k(JWT_TYPE, identifier.key_reference(key));
        let iat = now_seconds();
        let exp = iat + ISSUANCE_RESPONSE_LIFETIME_SECONDS;

        let mut attestations = self.attestations.clone();
        for (credential_type, raw_vc) in &self.presentations {
            let claims = VpClaims {
                jti: Uuid::new_v4().to_string(),
                vp: VerifiablePresentationDescriptor {
                    context: vec![VC_CONTEXT.to_string()],
                    types: vec![VERIFIABLE_PRESENTATION_TYPE.to_string()],
                    verifiable_credential: vec![raw_vc.clone()],
                },
                iss: identifier.did.clone(),
                aud: self.audience.clone(),
                iat,
                nbf: iat,
                exp,
                nonce: NonceCreator::create(&identifier.did),
            };
            let mut presentation = JwsToken::new(header.clone(), claims)?;
            presentation.sign(key);
            attestations
                .presentations
                .insert(credential_type.clone(), presentation.serialize());
        }

        let claims = IssuanceResponseClaims {
            aud: self.audience.clone(),
            contract: self.contract_url.clone(),
            attestations,
            pin: self.pin.clone(),
            iss: identifier.did.clone(),
            sub: identifier.did.clone(),
            did: identifier.did.clone(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp,
        };
        let mut token = JwsToken::new(header, claims)?;
        token.sign(key);
        Ok(token.serialize())
    }
}

fn hashed_pin(requirement: &PinRequirement) -> Option<String> {
    let pin = requirement.pin()?;
    let salted = format!("{}{}", requirement.salt.as_deref().unwrap_or_default(), pin);
    Some(STANDARD.encode(vid_secp256k1::sha256(salted.as_bytes())))
}
