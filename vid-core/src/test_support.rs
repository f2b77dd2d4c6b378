use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;
use vid_secp256k1::KeyPair;

use crate::configuration::{LibraryConfiguration, PreviewFeatureFlags};
use crate::identifier::{
    DidDocumentResolver, IdentifierDocument, InMemoryIdentifierManager, KeyContainer,
};
use crate::logger::WalletLibraryLogger;
use crate::networking::mock::MockHttpClient;
use crate::networking::{interop_prefer_header, LibraryNetworking, WalletLibraryNetworking};
use crate::root_of_trust::LinkedDomainResolver;
use crate::token::{EcPublicJwk, Header, JwsToken};

pub(crate) const DISCOVERY: &str = "https://discover.example/v1.0/identifiers";

pub(crate) fn networking(client: MockHttpClient) -> Arc<dyn LibraryNetworking> {
    Arc::new(WalletLibraryNetworking::new(
        client,
        WalletLibraryLogger::new(),
        None,
    ))
}

pub(crate) fn configuration(client: MockHttpClient) -> Arc<LibraryConfiguration> {
    let networking = networking(client);
    let logger = WalletLibraryLogger::new();
    Arc::new(LibraryConfiguration {
        logger: logger.clone(),
        networking: networking.clone(),
        identifier_manager: Arc::new(InMemoryIdentifierManager::new()),
        document_resolver: Arc::new(DidDocumentResolver::new(
            networking.clone(),
            Url::parse(DISCOVERY).unwrap(),
        )),
        root_of_trust_resolver: Arc::new(LinkedDomainResolver::new(networking, logger, None)),
        preferred_languages: vec!["en-US".to_string()],
        prefer_headers: vec![interop_prefer_header()],
        preview_feature_flags: PreviewFeatureFlags::default(),
    })
}

/// A remote party with a single signing key published under `#sign`.
pub(crate) struct TestIssuer {
    pub did: String,
    pub key: KeyContainer,
}

impl TestIssuer {
    pub fn new(did: &str) -> Self {
        Self {
            did: did.to_string(),
            key: KeyContainer::new("sign", KeyPair::generate()),
        }
    }

    pub fn kid(&self) -> String {
        format!("{}#{}", self.did, self.key.key_id)
    }

    pub fn document(&self, origin: Option<&str>) -> IdentifierDocument {
        let jwk = EcPublicJwk::from_key_pair(&self.key.key_pair, None).to_jwk();
        let service = match origin {
            Some(origin) => json!([{
                "id": "#linkeddomains",
                "type": "LinkedDomains",
                "serviceEndpoint": {"origins": [origin]}
            }]),
            None => json!([]),
        };
        serde_json::from_value(json!({
            "id": self.did,
            "verificationMethod": [{
                "id": format!("#{}", self.key.key_id),
                "type": "EcdsaSecp256k1VerificationKey2019",
                "controller": self.did,
                "publicKeyJwk": jwk,
            }],
            "service": service,
        }))
        .unwrap()
    }

    /// Serve this issuer's document from the test discovery endpoint.
    pub fn publish(&self, client: &MockHttpClient, origin: Option<&str>) {
        client.respond_json(
            &format!("{}/{}", DISCOVERY, self.did),
            json!({"didDocument": self.document(origin)}),
        );
    }

    pub fn sign<C: Serialize + DeserializeOwned>(&self, typ: &str, claims: C) -> String {
        let mut token = JwsToken::new(Header::es256k(typ, self.kid()), claims).unwrap();
        token.sign(&self.key);
        token.serialize()
    }

    pub fn did_configuration(&self, origin: &str) -> Value {
        let credential = self.sign(
            "JWT",
            json!({
                "iss": self.did,
                "sub": self.did,
                "vc": {
                    "credentialSubject": {"id": self.did, "origin": origin}
                }
            }),
        );
        json!({
            "@context": "https://identity.foundation/.well-known/did-configuration/v1",
            "linked_dids": [credential],
        })
    }
}
