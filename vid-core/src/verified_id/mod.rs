//! Verified IDs held by the wallet.

mod credential;
mod encoding;

pub use credential::{VcClaims, VcDescriptor, VerifiableCredential};
pub use encoding::VerifiedIdEncoder;

use serde_json::Value;

use crate::constants::VERIFIABLE_CREDENTIAL_TYPE;
use crate::requests::contract::DisplayDescriptor;
use crate::requests::openid4vci::CredentialConfiguration;
use crate::styles::{select_localized, VerifiedIdStyle};

/// One claim of a Verified ID, labelled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdClaim {
    pub id: String,
    pub label: Option<String>,
    pub value_type: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerifiedId {
    /// Issued through OpenID4VCI, displayed with the issuer's configuration.
    OpenId4Vci {
        vc: VerifiableCredential,
        configuration: CredentialConfiguration,
        issuer_name: String,
    },
    /// Issued against a contract, displayed with the contract's display.
    Contract {
        vc: VerifiableCredential,
        display: DisplayDescriptor,
    },
    /// Signed by the holder itself.
    SelfSigned { vc: VerifiableCredential },
}

impl VerifiedId {
    pub fn vc(&self) -> &VerifiableCredential {
        match self {
            VerifiedId::OpenId4Vci { vc, .. }
            | VerifiedId::Contract { vc, .. }
            | VerifiedId::SelfSigned { vc } => vc,
        }
    }

    pub fn id(&self) -> &str {
        self.vc().claims().jti.as_deref().unwrap_or_default()
    }

    pub fn issued_on(&self) -> u64 {
        self.vc().claims().iat.unwrap_or_default()
    }

    pub fn expires_on(&self) -> Option<u64> {
        self.vc().claims().exp
    }

    pub fn types(&self) -> &[String] {
        self.vc().types()
    }

    pub fn raw(&self) -> &str {
        self.vc().raw()
    }

    /// Claims labelled with the first display definition of each claim.
    pub fn claims(&self) -> Vec<VerifiedIdClaim> {
        self.localized_claims(&[])
    }

    /// Claims labelled for the first of `preferred_languages` the issuer
    /// provides a display for.
    pub fn localized_claims(&self, preferred_languages: &[String]) -> Vec<VerifiedIdClaim> {
        let subject = &self.vc().claims().vc.credential_subject;
        subject
            .iter()
            .map(|(id, value)| {
                let (label, value_type) = match self {
                    VerifiedId::OpenId4Vci { configuration, .. } => {
                        let definition = configuration.claim_definition(id);
                        (
                            definition
                                .and_then(|definition| definition.display.as_deref())
                                .and_then(|display| select_localized(display, preferred_languages))
                                .and_then(|display| display.name.clone()),
                            definition.and_then(|definition| definition.value_type.clone()),
                        )
                    }
                    // contracts carry a single locale
                    VerifiedId::Contract { display, .. } => {
                        let claim = display.claim_display(id);
                        (
                            claim.and_then(|claim| claim.label.clone()),
                            claim.and_then(|claim| claim.claim_type.clone()),
                        )
                    }
                    VerifiedId::SelfSigned { .. } => (None, None),
                };

                VerifiedIdClaim {
                    id: id.clone(),
                    label: label.or_else(|| Some(id.clone())),
                    value_type,
                    value: value.clone(),
                }
            })
            .collect()
    }

    pub fn style(&self) -> VerifiedIdStyle {
        self.localized_style(&[])
    }

    pub fn localized_style(&self, preferred_languages: &[String]) -> VerifiedIdStyle {
        match self {
            VerifiedId::OpenId4Vci {
                configuration,
                issuer_name,
                ..
            } => configuration.style(issuer_name, preferred_languages),
            VerifiedId::Contract { display, .. } => display.verified_id_style(),
            VerifiedId::SelfSigned { vc } => VerifiedIdStyle {
                name: vc
                    .types()
                    .iter()
                    .find(|t| t.as_str() != VERIFIABLE_CREDENTIAL_TYPE)
                    .cloned()
                    .unwrap_or_else(|| VERIFIABLE_CREDENTIAL_TYPE.to_string()),
                issuer: vc.claims().iss.clone().unwrap_or_default(),
                ..Default::default()
            },
        }
    }
}
