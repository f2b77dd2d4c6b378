use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::IdentifierDocument;
use crate::error::Result;
use crate::networking::LibraryNetworking;

/// Resolves a DID to its identifier document.
#[async_trait]
pub trait IdentifierDocumentResolving: Send + Sync {
    async fn resolve(&self, did: &str) -> Result<IdentifierDocument>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResolutionResponse {
    Envelope {
        #[serde(rename = "didDocument")]
        did_document: IdentifierDocument,
    },
    Document(IdentifierDocument),
}

/// Resolves DIDs through a discovery endpoint at `{discovery}/{did}`.
pub struct DidDocumentResolver {
    networking: Arc<dyn LibraryNetworking>,
    discovery_url: Url,
}

impl DidDocumentResolver {
    pub fn new(networking: Arc<dyn LibraryNetworking>, discovery_url: Url) -> Self {
        Self {
            networking,
            discovery_url,
        }
    }

    fn document_url(&self, did: &str) -> Result<Url> {
        let base = self.discovery_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, did))?)
    }
}

#[async_trait]
impl IdentifierDocumentResolving for DidDocumentResolver {
    async fn resolve(&self, did: &str) -> Result<IdentifierDocument> {
        let url = self.document_url(did)?;
        let response: ResolutionResponse = self.networking.fetch_json(&url, &[]).await?;

        Ok(match response {
            ResolutionResponse::Envelope { did_document } => did_document,
            ResolutionResponse::Document(document) => document,
        })
    }
}
