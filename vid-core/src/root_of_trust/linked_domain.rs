use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{RootOfTrust, RootOfTrustResolver};
use crate::call_site;
use crate::constants::{DID_CONFIGURATION_PATH, LINKED_DOMAINS_SERVICE_TYPE};
use crate::error::{Result, VerifiedIdError};
use crate::identifier::IdentifierDocument;
use crate::logger::WalletLibraryLogger;
use crate::networking::LibraryNetworking;
use crate::token::validation::validate_property;
use crate::token::JwsToken;

/// Outcome of checking the linked domain of an identifier document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedDomainResult {
    Verified { domain_url: String },
    Unverified { domain_url: String },
    Missing,
}

impl From<LinkedDomainResult> for RootOfTrust {
    fn from(result: LinkedDomainResult) -> Self {
        match result {
            LinkedDomainResult::Verified { domain_url } => RootOfTrust {
                verified: true,
                source: Some(domain_url),
            },
            LinkedDomainResult::Unverified { domain_url } => RootOfTrust {
                verified: false,
                source: Some(domain_url),
            },
            LinkedDomainResult::Missing => RootOfTrust::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WellKnownConfigDocument {
    #[serde(default)]
    linked_dids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainLinkageSubject {
    id: Option<String>,
    origin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainLinkageVc {
    credential_subject: Option<DomainLinkageSubject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DomainLinkageClaims {
    iss: Option<String>,
    sub: Option<String>,
    vc: Option<DomainLinkageVc>,
}

/// Verifies the `LinkedDomains` service of a document through the
/// domain's `did-configuration.json`.
pub struct LinkedDomainResolver {
    networking: Arc<dyn LibraryNetworking>,
    logger: WalletLibraryLogger,
    custom_resolver: Option<Arc<dyn RootOfTrustResolver>>,
}

impl LinkedDomainResolver {
    pub fn new(
        networking: Arc<dyn LibraryNetworking>,
        logger: WalletLibraryLogger,
        custom_resolver: Option<Arc<dyn RootOfTrustResolver>>,
    ) -> Self {
        Self {
            networking,
            logger,
            custom_resolver,
        }
    }

    pub async fn validate(&self, document: &IdentifierDocument) -> LinkedDomainResult {
        let Some(domain_url) = document
            .service_of_type(LINKED_DOMAINS_SERVICE_TYPE)
            .and_then(|service| service.origins().into_iter().next())
        else {
            return LinkedDomainResult::Missing;
        };

        let linked_dids = match self.fetch_linked_dids(&domain_url).await {
            Ok(linked_dids) => linked_dids,
            Err(error) => {
                self.logger.warning(
                    &format!("Unable to fetch well-known config for {}: {}", domain_url, error),
                    call_site!(),
                );
                return LinkedDomainResult::Unverified { domain_url };
            }
        };

        let verified = linked_dids.iter().any(|credential| {
            match validate_credential(credential, document, &domain_url) {
                Ok(()) => true,
                Err(error) => {
                    log::debug!("domain linkage credential rejected: {}", error);
                    false
                }
            }
        });

        if verified {
            LinkedDomainResult::Verified { domain_url }
        } else {
            LinkedDomainResult::Unverified { domain_url }
        }
    }

    async fn fetch_linked_dids(&self, domain_url: &str) -> Result<Vec<String>> {
        let url = Url::parse(&format!(
            "{}{}",
            domain_url.trim_end_matches('/'),
            DID_CONFIGURATION_PATH
        ))?;
        let config: WellKnownConfigDocument = self.networking.fetch_json(&url, &[]).await?;
        Ok(config.linked_dids)
    }
}

#[async_trait]
impl RootOfTrustResolver for LinkedDomainResolver {
    async fn resolve(&self, document: &IdentifierDocument) -> Result<RootOfTrust> {
        if let Some(custom) = &self.custom_resolver {
            match custom.resolve(document).await {
                Ok(root_of_trust) => return Ok(root_of_trust),
                Err(error) => self.logger.warning(
                    &format!("Custom root of trust resolver failed: {}", error),
                    call_site!(),
                ),
            }
        }

        Ok(self.validate(document).await.into())
    }
}

fn validate_credential(
    credential: &str,
    document: &IdentifierDocument,
    domain_url: &str,
) -> Result<()> {
    let token = JwsToken::<DomainLinkageClaims>::from_compact(credential)?;

    let subject = token
        .content
        .vc
        .as_ref()
        .and_then(|vc| vc.credential_subject.as_ref())
        .ok_or_else(|| {
            VerifiedIdError::missing_property("credentialSubject", "DomainLinkageCredential")
        })?;

    validate_property("credentialSubject.id", &document.id, subject.id.as_deref())?;
    validate_property("iss", &document.id, token.content.iss.as_deref())?;
    validate_property("sub", &document.id, token.content.sub.as_deref())?;

    let origin = subject.origin.as_deref().map(|o| o.trim_end_matches('/'));
    validate_property("origin", domain_url.trim_end_matches('/'), origin)?;

    let kid = token.header.kid.as_deref().unwrap_or_default();
    let parts: Vec<&str> = kid.split('#').collect();
    if parts.len() != 2 {
        return Err(VerifiedIdError::invalid_property("kid", "did#keyId", Some(kid)));
    }
    validate_property("kid", &document.id, Some(parts[0]))?;

    let jwk = document
        .get_jwk(&format!("#{}", parts[1]))
        .ok_or_else(VerifiedIdError::no_keys_in_document)?;
    if !token.verify(jwk)? {
        return Err(VerifiedIdError::invalid_signature());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::mock::MockHttpClient;
    use crate::test_support::{networking, TestIssuer};

    const ORIGIN: &str = "https://issuer.example/";
    const WELL_KNOWN: &str = "https://issuer.example/.well-known/did-configuration.json";

    fn resolver(client: &MockHttpClient) -> LinkedDomainResolver {
        LinkedDomainResolver::new(networking(client.clone()), WalletLibraryLogger::new(), None)
    }

    #[tokio::test]
    async fn test_verified_domain() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        client.respond_json(WELL_KNOWN, issuer.did_configuration(ORIGIN));

        let root = resolver(&client)
            .resolve(&issuer.document(Some(ORIGIN)))
            .await
            .unwrap();
        assert_eq!(
            root,
            RootOfTrust {
                verified: true,
                source: Some(ORIGIN.to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_credential_from_other_did_is_unverified() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let impostor = TestIssuer::new("did:web:impostor.example");
        let client = MockHttpClient::new();
        client.respond_json(WELL_KNOWN, impostor.did_configuration(ORIGIN));

        let result = resolver(&client).validate(&issuer.document(Some(ORIGIN))).await;
        assert_eq!(
            result,
            LinkedDomainResult::Unverified {
                domain_url: ORIGIN.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_signature_from_other_key_is_unverified() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let forger = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        client.respond_json(WELL_KNOWN, forger.did_configuration(ORIGIN));

        let result = resolver(&client).validate(&issuer.document(Some(ORIGIN))).await;
        assert!(matches!(result, LinkedDomainResult::Unverified { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unverified() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        client.respond(WELL_KNOWN, 500, "");

        let root = resolver(&client)
            .resolve(&issuer.document(Some(ORIGIN)))
            .await
            .unwrap();
        assert!(!root.verified);
        assert_eq!(root.source.as_deref(), Some(ORIGIN));
    }

    #[tokio::test]
    async fn test_missing_service() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let root = resolver(&MockHttpClient::new())
            .resolve(&issuer.document(None))
            .await
            .unwrap();
        assert_eq!(root, RootOfTrust::default());
    }

    struct FixedResolver(Option<RootOfTrust>);

    #[async_trait]
    impl RootOfTrustResolver for FixedResolver {
        async fn resolve(&self, _document: &IdentifierDocument) -> Result<RootOfTrust> {
            self.0
                .clone()
                .ok_or_else(|| VerifiedIdError::unspecified("no decision"))
        }
    }

    #[tokio::test]
    async fn test_custom_resolver_takes_precedence() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let custom = RootOfTrust {
            verified: true,
            source: Some("allow-list".to_string()),
        };
        let resolver = LinkedDomainResolver::new(
            networking(MockHttpClient::new()),
            WalletLibraryLogger::new(),
            Some(Arc::new(FixedResolver(Some(custom.clone())))),
        );

        let root = resolver.resolve(&issuer.document(Some(ORIGIN))).await.unwrap();
        assert_eq!(root, custom);
    }

    #[tokio::test]
    async fn test_failing_custom_resolver_falls_back() {
        let issuer = TestIssuer::new("did:web:issuer.example");
        let client = MockHttpClient::new();
        client.respond_json(WELL_KNOWN, issuer.did_configuration(ORIGIN));
        let resolver = LinkedDomainResolver::new(
            networking(client),
            WalletLibraryLogger::new(),
            Some(Arc::new(FixedResolver(None))),
        );

        let root = resolver.resolve(&issuer.document(Some(ORIGIN))).await.unwrap();
        assert!(root.verified);
    }
}
