//! OpenID4VCI wire types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{required, Result, VerifiedIdError};
use crate::styles::{select_localized, Localized, Logo, RequesterStyle, VerifiedIdStyle};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogoDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl From<&LogoDefinition> for Logo {
    fn from(logo: &LogoDefinition) -> Self {
        Logo {
            uri: logo.uri.clone(),
            alt_text: logo.alt_text.clone(),
        }
    }
}

/// Display of a credential in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedDisplayDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Localized for LocalizedDisplayDefinition {
    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimDisplayDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Localized for ClaimDisplayDefinition {
    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialSubjectDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Vec<ClaimDisplayDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    /// Keyed by claim path, e.g. `vc.credentialSubject.firstName`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<BTreeMap<String, CredentialSubjectDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptographic_binding_methods_supported: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptographic_suites_supported: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_definition: Option<CredentialDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Vec<LocalizedDisplayDefinition>>,
}

impl CredentialConfiguration {
    pub fn style(&self, issuer_name: &str, preferred_languages: &[String]) -> VerifiedIdStyle {
        let display = self
            .display
            .as_deref()
            .and_then(|display| select_localized(display, preferred_languages));

        match display {
            Some(display) => VerifiedIdStyle {
                name: display.name.clone().unwrap_or_default(),
                issuer: issuer_name.to_string(),
                background_color: display.background_color.clone(),
                text_color: display.text_color.clone(),
                description: display.description.clone(),
                logo: display.logo.as_ref().map(Logo::from),
            },
            None => VerifiedIdStyle {
                issuer: issuer_name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn claim_definition(&self, claim: &str) -> Option<&CredentialSubjectDefinition> {
        self.credential_definition
            .as_ref()?
            .credential_subject
            .as_ref()?
            .get(&format!("vc.credentialSubject.{}", claim))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedIssuerDisplayDefinition {
    pub name: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub logo: Option<LogoDefinition>,
}

impl Localized for LocalizedIssuerDisplayDefinition {
    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

/// Contents of `/.well-known/openid-credential-issuer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialMetadata {
    pub credential_issuer: Option<String>,
    pub authorization_servers: Option<Vec<String>>,
    pub credential_endpoint: Option<String>,
    pub notification_endpoint: Option<String>,
    pub signed_metadata: Option<String>,
    pub credential_configurations_supported: Option<BTreeMap<String, CredentialConfiguration>>,
    pub display: Option<Vec<LocalizedIssuerDisplayDefinition>>,
}

impl CredentialMetadata {
    /// Configuration for the first id the offer names.
    pub fn credential_configuration(&self, ids: &[String]) -> Result<&CredentialConfiguration> {
        ids.first()
            .and_then(|id| self.credential_configurations_supported.as_ref()?.get(id))
            .ok_or_else(|| {
                VerifiedIdError::malformed_credential_metadata(
                    "Request does not contain expected credential configuration.",
                )
            })
    }

    /// Every authorization server a grant points at must be listed by the
    /// issuer.
    pub fn validate_authorization_servers(&self, offer: &CredentialOffer) -> Result<()> {
        let servers = required(
            self.authorization_servers.as_ref(),
            "authorization_servers",
            "CredentialMetadata",
        )?;
        let hosts: Vec<String> = servers.iter().filter_map(|server| host(server)).collect();

        for grant in offer.grants.values() {
            let Some(server) = &grant.authorization_server else {
                continue;
            };
            let known = host(server).is_some_and(|grant_host| hosts.contains(&grant_host));
            if !known {
                return Err(VerifiedIdError::malformed_credential_metadata(format!(
                    "Authorization servers in Credential Metadata does not contain {}",
                    server
                )));
            }
        }

        Ok(())
    }

    pub fn requester_style(&self, preferred_languages: &[String]) -> RequesterStyle {
        let display = self
            .display
            .as_deref()
            .and_then(|display| select_localized(display, preferred_languages));

        RequesterStyle {
            name: display
                .and_then(|display| display.name.clone())
                .unwrap_or_default(),
            logo: display
                .and_then(|display| display.logo.as_ref())
                .map(Logo::from),
        }
    }
}

fn host(server: &str) -> Option<String> {
    Url::parse(server)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxCode {
    pub length: Option<i32>,
    pub input_mode: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialOfferGrant {
    pub authorization_server: Option<String>,
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: Option<String>,
    pub tx_code: Option<TxCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialOffer {
    pub credential_issuer: String,
    pub issuer_session: String,
    pub credential_configuration_ids: Vec<String>,
    pub grants: BTreeMap<String, CredentialOfferGrant>,
}

impl CredentialOffer {
    /// `None` unless the value has every required member and at least one
    /// grant.
    pub fn parse(value: &Value) -> Option<Self> {
        let offer: Self = serde_json::from_value(value.clone()).ok()?;
        (!offer.grants.is_empty()).then_some(offer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedMetadataClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub iat: Option<u64>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub exp: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenIdWellKnownConfiguration {
    pub issuer: Option<String>,
    pub token_endpoint: Option<String>,
    pub grant_types_supported: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRequestProof {
    pub proof_type: String,
    pub jwt: String,
}

/// Body POSTed to the credential endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCredentialRequest {
    pub credential_configuration_id: String,
    pub issuer_session: String,
    pub proof: CredentialRequestProof,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub iat: u64,
    pub at_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialResponse {
    pub credential: Option<String>,
    pub credentials: Option<Vec<Value>>,
    pub notification_id: Option<String>,
}

impl CredentialResponse {
    /// `credential`, or the first of `credentials` in either its string or
    /// `{"credential": ...}` form.
    pub fn first_credential(&self) -> Option<String> {
        if let Some(credential) = &self.credential {
            return Some(credential.clone());
        }

        let first = self.credentials.as_ref()?.first()?;
        first
            .as_str()
            .or_else(|| first.get("credential").and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialCompletionRequest {
    pub issuer_session: String,
    pub state: String,
    pub code: String,
}
