use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VerifiedIdError};
use crate::token::JwsToken;

/// The `vc` member of a verifiable credential JWT.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcDescriptor {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub credential_subject: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VcClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::token::numeric_date::deserialize"
    )]
    pub iat: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::token::numeric_date::deserialize"
    )]
    pub exp: Option<u64>,
    #[serde(default)]
    pub vc: VcDescriptor,
}

/// A verifiable credential kept in its original compact form.
///
/// Serializes as the raw JWT string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerifiableCredential {
    raw: String,
    claims: VcClaims,
    payload: Value,
}

impl VerifiableCredential {
    pub fn parse(raw: &str) -> Result<Self> {
        let token = JwsToken::<Value>::from_compact(raw)?;
        let claims: VcClaims = serde_json::from_value(token.content.clone())?;
        Ok(Self {
            raw: raw.trim().to_string(),
            claims,
            payload: token.content,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &VcClaims {
        &self.claims
    }

    /// Whole JWT payload, for constraint matching.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn types(&self) -> &[String] {
        &self.claims.vc.types
    }
}

impl TryFrom<String> for VerifiableCredential {
    type Error = VerifiedIdError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<VerifiableCredential> for String {
    fn from(credential: VerifiableCredential) -> Self {
        credential.raw
    }
}
