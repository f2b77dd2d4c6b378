use serde::de::DeserializeOwned;
use serde::Serialize;

use super::PresentationRequestClaims;
use crate::configuration::LibraryConfiguration;
use crate::error::{required, Result, VerifiedIdError};
use crate::root_of_trust::RootOfTrust;
use crate::token::validation::validate_times;
use crate::token::JwsToken;

/// Claims of a token a remote party signs with a key from its DID document.
pub(crate) trait SignedRequestClaims: Serialize + DeserializeOwned {
    /// Named in missing property errors.
    const CONTAINER: &'static str;

    fn iat(&self) -> Option<u64>;

    fn exp(&self) -> Option<u64>;
}

impl SignedRequestClaims for PresentationRequestClaims {
    const CONTAINER: &'static str = "PresentationRequest";

    fn iat(&self) -> Option<u64> {
        self.iat
    }

    fn exp(&self) -> Option<u64> {
        self.exp
    }
}

/// Check a signed request against its signer's document and decide how
/// far the signer can be trusted.
pub(crate) async fn validate_signed_request<C: SignedRequestClaims>(
    configuration: &LibraryConfiguration,
    raw: &str,
) -> Result<(JwsToken<C>, RootOfTrust)> {
    let token = JwsToken::<C>::from_compact(raw)?;

    let kid = required(token.header.kid.as_deref(), "kid", C::CONTAINER)?;
    let parts: Vec<&str> = kid.split('#').collect();
    let [did, key_id] = parts.as_slice() else {
        return Err(VerifiedIdError::invalid_property("kid", "did#keyId", Some(kid)));
    };

    let document = configuration.document_resolver.resolve(did).await?;
    let jwk = document
        .get_jwk(&format!("#{}", key_id))
        .ok_or_else(VerifiedIdError::no_keys_in_document)?;

    if !token.verify(jwk)? {
        return Err(VerifiedIdError::invalid_signature());
    }
    validate_times(token.content.iat(), token.content.exp())?;

    let root_of_trust = configuration
        .root_of_trust_resolver
        .resolve(&document)
        .await?;

    Ok((token, root_of_trust))
}

pub(crate) async fn validate_presentation_request(
    configuration: &LibraryConfiguration,
    raw: &str,
) -> Result<(JwsToken<PresentationRequestClaims>, RootOfTrust)> {
    validate_signed_request(configuration, raw).await
}
