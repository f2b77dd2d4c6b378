use super::models::{
    CredentialMetadata, CredentialOffer, CredentialRequestProof, ProofClaims,
    RawCredentialRequest,
};
use crate::constants::PROOF_JWT_TYPE;
use crate::error::{required, Result, VerifiedIdError};
use crate::identifier::HolderIdentifier;
use crate::token::validation::now_seconds;
use crate::token::{b64url, Header, JwsToken};

const PROOF_TYPE: &str = "jwt";

/// Builds the body POSTed to the credential endpoint, including the
/// holder's proof of possession bound to the access token.
pub(crate) fn format_credential_request(
    offer: &CredentialOffer,
    metadata: &CredentialMetadata,
    access_token: &str,
    identifier: &HolderIdentifier,
) -> Result<RawCredentialRequest> {
    let configuration_id = offer.credential_configuration_ids.first().ok_or_else(|| {
        VerifiedIdError::request_creation("Configuration Id not present in Credential Offer.")
    })?;
    let credential_endpoint = required(
        metadata.credential_endpoint.as_deref(),
        "credential_endpoint",
        "CredentialMetadata",
    )?;

    let key = identifier.signing_key()?;
    let claims = ProofClaims {
        aud: credential_endpoint.to_string(),
        iss: identifier.did.clone(),
        sub: identifier.did.clone(),
        iat: now_seconds(),
        at_hash: b64url(vid_secp256k1::sha256(access_token.as_bytes())),
    };
    let mut proof = JwsToken::new(
        Header::es256k(PROOF_JWT_TYPE, identifier.key_reference(key)),
        claims,
    )?;
    proof.sign(key);

    Ok(RawCredentialRequest {
        credential_configuration_id: configuration_id.clone(),
        issuer_session: offer.issuer_session.clone(),
        proof: CredentialRequestProof {
            proof_type: PROOF_TYPE.to_string(),
            jwt: proof.serialize(),
        },
    })
}
