use std::sync::Arc;

use super::models::SignedMetadataClaims;
use crate::configuration::LibraryConfiguration;
use crate::error::{Result, VerifiedIdError};
use crate::identifier::IdentifierDocument;
use crate::root_of_trust::RootOfTrust;
use crate::token::validation::{validate_property, validate_times};
use crate::token::JwsToken;

/// Verifies the issuer's `signed_metadata` and derives the root of trust
/// from the signer's linked domain.
pub struct SignedMetadataProcessor {
    configuration: Arc<LibraryConfiguration>,
}

impl SignedMetadataProcessor {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self { configuration }
    }

    pub async fn process(
        &self,
        signed_metadata: &str,
        credential_issuer: &str,
    ) -> Result<RootOfTrust> {
        let token = JwsToken::<SignedMetadataClaims>::from_compact(signed_metadata).map_err(|err| {
            VerifiedIdError::malformed_signed_metadata("Signed Metadata is not a JSON Web Token.")
                .with_inner(err)
        })?;

        let kid = token.header.kid.as_deref().unwrap_or_default();
        let (did, key_id) = match kid.split('#').collect::<Vec<_>>().as_slice() {
            [did, key_id] => (did.to_string(), key_id.to_string()),
            _ => {
                return Err(VerifiedIdError::malformed_signed_metadata(
                    "Unable to extract Key Id from Signed Metadata Token.",
                ))
            }
        };

        let document = self.configuration.document_resolver.resolve(&did).await?;

        validate(&token, &document, &did, &key_id, credential_issuer).map_err(|err| {
            VerifiedIdError::malformed_signed_metadata("Signed metadata is not valid.")
                .with_inner(err)
        })?;

        self.configuration
            .root_of_trust_resolver
            .resolve(&document)
            .await
    }
}

fn validate(
    token: &JwsToken<SignedMetadataClaims>,
    document: &IdentifierDocument,
    did: &str,
    key_id: &str,
    credential_issuer: &str,
) -> Result<()> {
    let jwk = document.get_jwk(&format!("#{}", key_id)).ok_or_else(|| {
        VerifiedIdError::malformed_signed_metadata("Key Id not defined in Identifier Document.")
    })?;

    validate_property("iss", did, token.content.iss.as_deref())?;
    validate_property("sub", credential_issuer, token.content.sub.as_deref())?;
    validate_times(token.content.iat, token.content.exp)?;

    if !token.verify(jwk)? {
        return Err(VerifiedIdError::invalid_signature());
    }
    Ok(())
}
