use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{VerifiableCredential, VerifiedId};
use crate::error::{Result, VerifiedIdError};
use crate::requests::contract::DisplayDescriptor;
use crate::requests::openid4vci::CredentialConfiguration;

const OPENID4VCI_TYPE: &str = "OpenId4VCI";
const CONTRACT_TYPE: &str = "VerifiableCredential";
const SELF_SIGNED_TYPE: &str = "SelfSigned";

#[derive(Serialize, Deserialize)]
struct EncodedVerifiedId {
    #[serde(rename = "type")]
    kind: String,
    raw: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenId4VciContents {
    vc: VerifiableCredential,
    configuration: CredentialConfiguration,
    issuer_name: String,
}

#[derive(Serialize, Deserialize)]
struct ContractContents {
    vc: VerifiableCredential,
    display: DisplayDescriptor,
}

#[derive(Serialize, Deserialize)]
struct SelfSignedContents {
    vc: VerifiableCredential,
}

/// Converts Verified IDs to and from the bytes a host stores.
///
/// The outer JSON names the variant, `raw` holds the base64 of the
/// variant's own JSON.
pub struct VerifiedIdEncoder;

impl VerifiedIdEncoder {
    pub fn encode(verified_id: &VerifiedId) -> Result<Vec<u8>> {
        let (kind, contents) = match verified_id {
            VerifiedId::OpenId4Vci {
                vc,
                configuration,
                issuer_name,
            } => (
                OPENID4VCI_TYPE,
                serde_json::to_vec(&OpenId4VciContents {
                    vc: vc.clone(),
                    configuration: configuration.clone(),
                    issuer_name: issuer_name.clone(),
                })?,
            ),
            VerifiedId::Contract { vc, display } => (
                CONTRACT_TYPE,
                serde_json::to_vec(&ContractContents {
                    vc: vc.clone(),
                    display: display.clone(),
                })?,
            ),
            VerifiedId::SelfSigned { vc } => (
                SELF_SIGNED_TYPE,
                serde_json::to_vec(&SelfSignedContents { vc: vc.clone() })?,
            ),
        };

        let encoded = EncodedVerifiedId {
            kind: kind.to_string(),
            raw: STANDARD.encode(contents),
        };
        Ok(serde_json::to_vec(&encoded)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<VerifiedId> {
        let encoded: EncodedVerifiedId = serde_json::from_slice(bytes)?;
        let contents = STANDARD.decode(encoded.raw)?;

        match encoded.kind.as_str() {
            OPENID4VCI_TYPE => {
                let contents: OpenId4VciContents = serde_json::from_slice(&contents)?;
                Ok(VerifiedId::OpenId4Vci {
                    vc: contents.vc,
                    configuration: contents.configuration,
                    issuer_name: contents.issuer_name,
                })
            }
            CONTRACT_TYPE => {
                let contents: ContractContents = serde_json::from_slice(&contents)?;
                Ok(VerifiedId::Contract {
                    vc: contents.vc,
                    display: contents.display,
                })
            }
            SELF_SIGNED_TYPE => {
                let contents: SelfSignedContents = serde_json::from_slice(&contents)?;
                Ok(VerifiedId::SelfSigned { vc: contents.vc })
            }
            other => Err(VerifiedIdError::malformed_input(format!(
                "Unknown Verified ID type: {}.",
                other
            ))),
        }
    }
}
