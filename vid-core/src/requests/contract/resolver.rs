use std::sync::Arc;

use url::Url;

use super::models::{ContractClaims, ContractResponse};
use crate::configuration::LibraryConfiguration;
use crate::error::Result;
use crate::requests::presentation::{validate_signed_request, SignedRequestClaims};
use crate::root_of_trust::RootOfTrust;
use crate::wallet_log;

impl SignedRequestClaims for ContractClaims {
    const CONTAINER: &'static str = "Contract";

    fn iat(&self) -> Option<u64> {
        self.iat
    }

    fn exp(&self) -> Option<u64> {
        self.exp
    }
}

/// A contract whose signature and signer have been checked.
#[derive(Debug, Clone)]
pub struct ResolvedContract {
    pub url: Url,
    pub claims: ContractClaims,
    pub root_of_trust: RootOfTrust,
}

/// Fetches issuance contracts and validates them like signed requests.
pub struct ManifestResolver {
    configuration: Arc<LibraryConfiguration>,
}

impl ManifestResolver {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self { configuration }
    }

    pub async fn resolve(&self, url: &Url) -> Result<ResolvedContract> {
        let response: ContractResponse = self
            .configuration
            .networking
            .fetch_json(url, &self.configuration.prefer_headers)
            .await?;

        let (token, root_of_trust) =
            validate_signed_request::<ContractClaims>(&self.configuration, &response.token).await?;
        wallet_log!(
            self.configuration.logger,
            Debug,
            "contract {} resolved, issuer verified: {}",
            url,
            root_of_trust.verified
        );

        Ok(ResolvedContract {
            url: url.clone(),
            claims: token.content,
            root_of_trust,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::networking::mock::MockHttpClient;
    use crate::requests::contract::models::tests::contract_json;
    use crate::test_support::{configuration, TestIssuer};
    use serde_json::json;

    const CONTRACT_URL: &str = "https://issuer.example/contracts/EmployeeCard";

    #[tokio::test]
    async fn test_resolve_validates_signed_contract() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        issuer.publish(&client, None);
        let token = issuer.sign("JWT", contract_json(json!({"selfIssued": {"claims": [{"claim": "nickname"}]}})));
        client.respond_json(CONTRACT_URL, json!({"token": token}));

        let resolver = ManifestResolver::new(configuration(client.clone()));
        let contract = resolver.resolve(&Url::parse(CONTRACT_URL).unwrap()).await.unwrap();

        assert_eq!(contract.claims.display.card.title, "Employee Card");
        assert_eq!(contract.url.as_str(), CONTRACT_URL);
        assert!(!contract.root_of_trust.verified);
        assert!(client.requests_to(CONTRACT_URL)[0]
            .has_header("prefer", "oid4vci-interop-profile-version=0.0.1"));
    }

    #[tokio::test]
    async fn test_contract_signed_by_other_key_is_rejected() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let forger = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        issuer.publish(&client, None);
        client.respond_json(
            CONTRACT_URL,
            json!({"token": forger.sign("JWT", contract_json(json!({})))}),
        );

        let err = ManifestResolver::new(configuration(client))
            .resolve(&Url::parse(CONTRACT_URL).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::TOKEN_INVALID);
    }

    #[tokio::test]
    async fn test_unreachable_contract_is_networking_error() {
        let err = ManifestResolver::new(configuration(MockHttpClient::new()))
            .resolve(&Url::parse(CONTRACT_URL).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::NETWORKING);
    }
}
