//! Issuance contract (manifest) wire types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::styles::{Logo, RequesterStyle, VerifiedIdStyle};

const CLAIM_PREFIX: &str = "vc.credentialSubject.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoDescriptor {
    pub uri: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDisplayDescriptor {
    pub title: String,
    pub issued_by: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub logo: Option<LogoDescriptor>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentDisplayDescriptor {
    pub title: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDisplayDescriptor {
    #[serde(rename = "type")]
    pub claim_type: Option<String>,
    pub label: Option<String>,
}

/// How the issued Verified ID and its claims are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub id: Option<String>,
    pub locale: Option<String>,
    pub contract: Option<String>,
    pub card: CardDisplayDescriptor,
    pub consent: Option<ConsentDisplayDescriptor>,
    /// Keyed by `vc.credentialSubject.<claim>`.
    #[serde(default)]
    pub claims: BTreeMap<String, ClaimDisplayDescriptor>,
}

impl DisplayDescriptor {
    pub fn claim_display(&self, claim: &str) -> Option<&ClaimDisplayDescriptor> {
        self.claims
            .get(&format!("{}{}", CLAIM_PREFIX, claim))
            .or_else(|| self.claims.get(claim))
    }

    pub fn verified_id_style(&self) -> VerifiedIdStyle {
        let card = &self.card;
        VerifiedIdStyle {
            name: card.title.clone(),
            issuer: card.issued_by.clone(),
            background_color: card.background_color.clone(),
            text_color: card.text_color.clone(),
            description: card.description.clone(),
            logo: card.logo.as_ref().map(|logo| Logo {
                uri: logo.uri.clone(),
                alt_text: logo.description.clone(),
            }),
        }
    }

    pub fn issuer_style(&self) -> RequesterStyle {
        RequesterStyle {
            name: self.card.issued_by.clone(),
            logo: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDescriptor {
    pub claim: String,
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfIssuedClaimsDescriptor {
    pub encrypted: Option<bool>,
    pub claims: Option<Vec<ClaimDescriptor>>,
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerDescriptor {
    pub iss: String,
}

/// A Verified ID the holder must present to be issued a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDescriptor {
    pub encrypted: Option<bool>,
    pub claims: Option<Vec<ClaimDescriptor>>,
    pub required: Option<bool>,
    pub credential_type: String,
    pub issuers: Option<Vec<IssuerDescriptor>>,
    /// Contracts that issue a matching Verified ID.
    pub contracts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenDescriptor {
    pub encrypted: Option<bool>,
    pub claims: Option<Vec<ClaimDescriptor>>,
    pub required: Option<bool>,
    /// OpenID configuration of the identity provider.
    pub configuration: String,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDescriptor {
    pub encrypted: Option<bool>,
    pub claims: Option<Vec<ClaimDescriptor>>,
    pub required: Option<bool>,
    pub configuration: Option<String>,
    pub resource_id: Option<String>,
    pub obo_scope: Option<String>,
}

/// What the issuer needs from the holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationsDescriptor {
    pub self_issued: Option<SelfIssuedClaimsDescriptor>,
    pub presentations: Option<Vec<PresentationDescriptor>>,
    pub id_tokens: Option<Vec<IdTokenDescriptor>>,
    pub access_tokens: Option<Vec<AccessTokenDescriptor>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInputDescriptor {
    pub id: Option<String>,
    /// Endpoint the issuance response is posted to.
    pub credential_issuer: String,
    pub issuer: Option<String>,
    pub attestations: Option<AttestationsDescriptor>,
}

/// Claims of a signed issuance contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractClaims {
    pub id: Option<String>,
    pub display: DisplayDescriptor,
    pub input: ContractInputDescriptor,
    pub iss: Option<String>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub iat: Option<u64>,
    #[serde(default, deserialize_with = "crate::token::numeric_date::deserialize")]
    pub exp: Option<u64>,
}

/// Body of a contract fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ContractResponse {
    pub token: String,
}

/// Body of a successful issuance response post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IssuedCredentialResponse {
    pub vc: String,
}

/// Attestations the holder sends back, keyed the way the contract asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationsResponse {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub id_tokens: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub access_tokens: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub self_issued: BTreeMap<String, String>,
    /// Verifiable presentation JWTs keyed by credential type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub presentations: BTreeMap<String, String>,
}

/// Claims of the signed issuance response posted to the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceResponseClaims {
    pub aud: String,
    pub contract: String,
    pub attestations: AttestationsResponse,
    /// base64(SHA-256(salt + pin)).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    pub iss: String,
    pub sub: String,
    pub did: String,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceCompletionCode {
    IssuanceSuccessful,
    IssuanceFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceCompletionDetails {
    UserCanceled,
    FetchContractError,
    IssuanceServiceError,
    UnspecifiedError,
}

/// Outcome reported to the requester's callback once issuance ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceCompletionResponse {
    pub code: IssuanceCompletionCode,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<IssuanceCompletionDetails>,
}

impl IssuanceCompletionResponse {
    pub fn succeeded(state: impl Into<String>) -> Self {
        Self {
            code: IssuanceCompletionCode::IssuanceSuccessful,
            state: state.into(),
            details: None,
        }
    }

    pub fn failed(state: impl Into<String>, details: IssuanceCompletionDetails) -> Self {
        Self {
            code: IssuanceCompletionCode::IssuanceFailed,
            state: state.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    pub(crate) const CREDENTIAL_ISSUER: &str = "https://issuer.example/issue";

    pub(crate) fn contract_json(attestations: Value) -> Value {
        json!({
            "id": "EmployeeCard",
            "display": {
                "locale": "en-US",
                "contract": "https://issuer.example/contracts/EmployeeCard",
                "card": {
                    "title": "Employee Card",
                    "issuedBy": "Contoso",
                    "backgroundColor": "#000000",
                    "textColor": "#ffffff",
                    "logo": {"uri": "https://issuer.example/logo.png", "description": "Contoso logo"},
                    "description": "Proof of employment"
                },
                "consent": {"title": "Get your card", "instructions": "Sign in first"},
                "claims": {
                    "vc.credentialSubject.givenName": {"type": "String", "label": "First name"}
                }
            },
            "input": {
                "id": "input",
                "credentialIssuer": CREDENTIAL_ISSUER,
                "issuer": "did:web:issuer.example",
                "attestations": attestations
            }
        })
    }

    #[test]
    fn test_contract_parses_display_and_attestations() {
        let contract: ContractClaims = serde_json::from_value(contract_json(json!({
            "idTokens": [{
                "configuration": "https://login.example/.well-known/openid-configuration",
                "client_id": "wallet",
                "redirect_uri": "vcclient://openid",
                "scope": "openid",
                "required": true
            }],
            "selfIssued": {"claims": [{"claim": "nickname"}]},
            "presentations": [{"credentialType": "Badge", "contracts": ["https://issuer.example/contracts/Badge"]}],
            "accessTokens": [{"configuration": "cfg", "resourceId": "res", "oboScope": "res/.default"}]
        })))
        .unwrap();

        assert_eq!(contract.input.credential_issuer, CREDENTIAL_ISSUER);
        let attestations = contract.input.attestations.unwrap();
        assert_eq!(attestations.id_tokens.unwrap()[0].client_id.as_deref(), Some("wallet"));
        assert_eq!(attestations.presentations.unwrap()[0].credential_type, "Badge");
        assert_eq!(
            attestations.access_tokens.unwrap()[0].obo_scope.as_deref(),
            Some("res/.default")
        );

        let style = contract.display.verified_id_style();
        assert_eq!(style.name, "Employee Card");
        assert_eq!(style.issuer, "Contoso");
        assert_eq!(style.logo.unwrap().alt_text.as_deref(), Some("Contoso logo"));
        assert_eq!(contract.display.issuer_style().name, "Contoso");
        assert_eq!(
            contract.display.claim_display("givenName").unwrap().label.as_deref(),
            Some("First name")
        );
    }

    #[test]
    fn test_completion_response_wire_format() {
        let failed = IssuanceCompletionResponse::failed(
            "state-1",
            IssuanceCompletionDetails::FetchContractError,
        );
        assert_eq!(
            serde_json::to_value(failed).unwrap(),
            json!({"code": "issuance_failed", "state": "state-1", "details": "fetch_contract_error"})
        );
        assert_eq!(
            serde_json::to_value(IssuanceCompletionResponse::succeeded("state-1")).unwrap(),
            json!({"code": "issuance_successful", "state": "state-1"})
        );
    }
}
