use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vid_secp256k1::Es256k;

use super::{b64url, b64url_decode, Jwk};
use crate::error::{Result, VerifiedIdError};
use crate::identifier::KeyContainer;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<Jwk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

impl Header {
    /// ES256K header for a token signed by `kid`.
    pub fn es256k(typ: &str, kid: impl Into<String>) -> Self {
        Self {
            typ: Some(typ.to_string()),
            alg: Some(Es256k::ALGORITHM.to_string()),
            kid: Some(kid.into()),
            ..Default::default()
        }
    }
}

/// A JWS in compact serialization with typed claims.
#[derive(Debug, Clone)]
pub struct JwsToken<C> {
    pub header: Header,
    pub content: C,
    protected_message: String,
    signature: Option<Vec<u8>>,
}

impl<C: Serialize + DeserializeOwned> JwsToken<C> {
    pub fn new(header: Header, content: C) -> Result<Self> {
        let protected_message = format!(
            "{}.{}",
            b64url(serde_json::to_vec(&header)?),
            b64url(serde_json::to_vec(&content)?)
        );
        Ok(Self {
            header,
            content,
            protected_message,
            signature: None,
        })
    }

    /// Parse `header.payload[.signature]`.
    ///
    /// The protected message keeps the encoded text as received so the
    /// signature can be checked against it.
    pub fn from_compact(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(VerifiedIdError::malformed_input(
                "Token is not a compact JWS.",
            ));
        }

        let header: Header = serde_json::from_slice(&b64url_decode(parts[0])?)?;
        let content: C = serde_json::from_slice(&b64url_decode(parts[1])?)?;
        let signature = match parts.get(2) {
            Some(encoded) if !encoded.is_empty() => Some(b64url_decode(encoded)?),
            _ => None,
        };

        Ok(Self {
            header,
            content,
            protected_message: format!("{}.{}", parts[0], parts[1]),
            signature,
        })
    }

    pub fn protected_message(&self) -> &str {
        &self.protected_message
    }

    /// The payload as sent, including claims `C` does not model.
    pub fn raw_payload(&self) -> Result<Map<String, Value>> {
        let encoded = self.protected_message.split('.').nth(1).unwrap_or_default();
        Ok(serde_json::from_slice(&b64url_decode(encoded)?)?)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn sign(&mut self, key: &KeyContainer) {
        let signature = Es256k::sign(
            self.protected_message.as_bytes(),
            key.key_pair.secret_key(),
        );
        self.signature = Some(signature.to_vec());
    }

    /// Compact serialization, with an empty signature part when unsigned.
    pub fn serialize(&self) -> String {
        let signature = self.signature.as_deref().map(b64url).unwrap_or_default();
        format!("{}.{}", self.protected_message, signature)
    }

    /// Check the signature against `jwk`. Unsigned tokens never verify.
    pub fn verify(&self, jwk: &Jwk) -> Result<bool> {
        let Some(signature) = &self.signature else {
            return Ok(false);
        };
        let public_key = jwk.public_key()?;
        Ok(Es256k::verify(
            self.protected_message.as_bytes(),
            signature,
            &public_key,
        )?)
    }
}
