//! OpenID presentation request and response wire types.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::ISSUANCE_PROMPT;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type")]
    pub filter_type: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub path: Option<Vec<String>>,
    pub purpose: Option<String>,
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    pub fields: Option<Vec<Field>>,
    pub exclusive_presentation_with: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputDescriptorSchema {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuanceMetadata {
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub id: Option<String>,
    pub schema: Option<Vec<InputDescriptorSchema>>,
    pub issuance: Option<Vec<IssuanceMetadata>>,
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub constraints: Option<Constraints>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresentationDefinition {
    pub id: Option<String>,
    pub input_descriptors: Option<Vec<InputDescriptor>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VpTokenRequest {
    pub presentation_definition: Option<PresentationDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedClaims {
    /// A single request object or a list of them.
    #[serde(default, deserialize_with = "one_or_many")]
    pub vp_token: Vec<VpTokenRequest>,
}

/// Pin the holder must enter alongside an injected id_token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinDescriptor {
    #[serde(rename = "type")]
    pub pin_type: Option<String>,
    pub length: usize,
    pub hash: Option<String>,
    pub salt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub client_name: Option<String>,
    pub client_purpose: Option<String>,
    pub logo_uri: Option<String>,
    pub subject_syntax_types_supported: Option<Vec<String>>,
    pub vp_formats: Option<serde_json::Value>,
}

/// Claims of a signed presentation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresentationRequestClaims {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub response_type: Option<String>,
    pub response_mode: Option<String>,
    pub claims: Option<RequestedClaims>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub scope: Option<String>,
    pub prompt: Option<String>,
    pub registration: Option<Registration>,
    pub id_token_hint: Option<String>,
    pub pin: Option<PinDescriptor>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub iat: Option<u64>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub exp: Option<u64>,
}

impl PresentationRequestClaims {
    /// `prompt=create` asks the wallet to get a Verified ID issued.
    pub fn is_issuance(&self) -> bool {
        self.prompt.as_deref() == Some(ISSUANCE_PROMPT)
    }

    pub fn vp_token_requests(&self) -> &[VpTokenRequest] {
        self.claims
            .as_ref()
            .map(|claims| claims.vp_token.as_slice())
            .unwrap_or_default()
    }

    /// Id of the first presentation definition.
    pub fn definition_id(&self) -> Option<&str> {
        self.vp_token_requests()
            .iter()
            .find_map(|request| request.presentation_definition.as_ref()?.id.as_deref())
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedInputDescriptorMapping {
    pub id: String,
    pub format: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptorMapping {
    pub id: String,
    pub format: String,
    pub path: String,
    pub path_nested: NestedInputDescriptorMapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSubmission {
    pub id: String,
    pub definition_id: String,
    pub descriptor_map: Vec<InputDescriptorMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpTokenDescription {
    pub presentation_submission: PresentationSubmission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub aud: String,
    pub nonce: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(rename = "_vp_token")]
    pub vp_token: Vec<VpTokenDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiablePresentationDescriptor {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpClaims {
    pub jti: String,
    pub vp: VerifiablePresentationDescriptor,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    pub nonce: String,
}
