//! Trust decisions about the party behind a request.

mod linked_domain;

pub use linked_domain::{LinkedDomainResolver, LinkedDomainResult};

use async_trait::async_trait;

use crate::error::Result;
use crate::identifier::IdentifierDocument;

/// Whether the requester could be tied to a verified source, and which.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RootOfTrust {
    pub verified: bool,
    pub source: Option<String>,
}

/// Hosts can plug their own trust decision in through the builder.
#[async_trait]
pub trait RootOfTrustResolver: Send + Sync {
    async fn resolve(&self, document: &IdentifierDocument) -> Result<RootOfTrust>;
}
