use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::Jwk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default)]
    pub controller: Option<String>,
    pub public_key_jwk: Jwk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDocumentService {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: Value,
}

impl IdentifierDocumentService {
    /// `serviceEndpoint.origins`, for linked domain services.
    pub fn origins(&self) -> Vec<String> {
        self.service_endpoint
            .get("origins")
            .and_then(Value::as_array)
            .map(|origins| {
                origins
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDocument {
    pub id: String,
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub service: Vec<IdentifierDocumentService>,
}

impl IdentifierDocument {
    /// Key published under `key_id`, written either `#frag` or `did#frag`.
    pub fn get_jwk(&self, key_id: &str) -> Option<&Jwk> {
        let fragment = key_id.rsplit('#').next().unwrap_or(key_id);
        self.verification_method
            .iter()
            .find(|method| {
                method.id == key_id
                    || method.id.rsplit('#').next() == Some(fragment)
                        && (method.id.starts_with('#') || method.id.starts_with(&self.id))
            })
            .map(|method| &method.public_key_jwk)
    }

    pub fn service_of_type(&self, service_type: &str) -> Option<&IdentifierDocumentService> {
        self.service
            .iter()
            .find(|service| service.service_type == service_type)
    }
}
