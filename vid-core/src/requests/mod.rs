//! Turning request inputs into issuance and presentation requests.
//!
//! An input is first resolved into a [`RawRequest`] by a [`RequestResolving`]
//! implementation, then a [`RequestProcessing`] implementation turns it into
//! a [`VerifiedIdRequest`] the host can fulfill and complete.

pub mod contract;
mod extension;
pub mod openid4vci;
pub mod presentation;
mod resolver;

pub use extension::{RequestProcessorExtendable, VerifiedIdPartialRequest};
pub use resolver::OpenIdUrlRequestResolver;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::requirements::Requirement;
use crate::root_of_trust::RootOfTrust;
use crate::styles::{RequesterStyle, VerifiedIdStyle};
use crate::token::JwsToken;
use crate::verified_id::VerifiedId;
use presentation::PresentationRequestClaims;

/// Where a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifiedIdRequestInput {
    Url(Url),
}

/// A resolved but not yet interpreted request.
#[derive(Debug)]
pub enum RawRequest {
    /// A validated, signed presentation request.
    PresentationRequest {
        token: JwsToken<PresentationRequestClaims>,
        root_of_trust: RootOfTrust,
    },
    /// An OpenID4VCI credential offer.
    CredentialOffer(Value),
}

#[async_trait]
pub trait RequestResolving: Send + Sync {
    fn can_resolve(&self, input: &VerifiedIdRequestInput) -> bool;

    async fn resolve(&self, input: &VerifiedIdRequestInput) -> Result<RawRequest>;
}

#[async_trait]
pub trait RequestProcessing: Send + Sync {
    fn can_process(&self, raw_request: &RawRequest) -> bool;

    async fn process(&self, raw_request: RawRequest) -> Result<VerifiedIdRequest>;
}

/// A request for the holder to receive a Verified ID.
#[async_trait]
pub trait VerifiedIdIssuanceRequest: Send + Sync {
    fn style(&self) -> &RequesterStyle;

    /// How the Verified ID will look once issued.
    fn verified_id_style(&self) -> &VerifiedIdStyle;

    fn requirement(&self) -> &Requirement;

    fn requirement_mut(&mut self) -> &mut Requirement;

    fn root_of_trust(&self) -> &RootOfTrust;

    fn is_satisfied(&self) -> bool {
        self.requirement().is_valid()
    }

    async fn complete(&self) -> Result<VerifiedId>;

    /// Abandon the request. Always fails with `user_canceled`.
    async fn cancel(&self, message: Option<String>) -> Result<()>;
}

/// A request for the holder to present Verified IDs.
#[async_trait]
pub trait VerifiedIdPresentationRequest: Send + Sync {
    fn style(&self) -> &RequesterStyle;

    fn requirement(&self) -> &Requirement;

    fn requirement_mut(&mut self) -> &mut Requirement;

    fn root_of_trust(&self) -> &RootOfTrust;

    fn is_satisfied(&self) -> bool {
        self.requirement().is_valid()
    }

    async fn complete(&self) -> Result<()>;

    /// Abandon the request. Always fails with `user_canceled`.
    async fn cancel(&self, message: Option<String>) -> Result<()>;
}

pub enum VerifiedIdRequest {
    Issuance(Box<dyn VerifiedIdIssuanceRequest>),
    Presentation(Box<dyn VerifiedIdPresentationRequest>),
}

impl std::fmt::Debug for VerifiedIdRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifiedIdRequest::Issuance(request) => f
                .debug_struct("Issuance")
                .field("style", request.style())
                .field("requirement", request.requirement())
                .finish(),
            VerifiedIdRequest::Presentation(request) => f
                .debug_struct("Presentation")
                .field("style", request.style())
                .field("requirement", request.requirement())
                .finish(),
        }
    }
}
