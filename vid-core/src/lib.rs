//! Verified ID wallet core.
//!
//! Resolves OpenID presentation requests, contract issuance requests and
//! OpenID4VCI credential offers into requests a host fulfills, then answers
//! them with the holder's did:ion identifier.
//!
//! ## Core Types
//!
//! - [`VerifiedIdClientBuilder`] / [`VerifiedIdClient`] - entry point
//! - [`VerifiedIdRequest`] - issuance or presentation request to fulfill
//! - [`Requirement`] - what a request needs before it can complete
//! - [`VerifiedId`] - a credential held by the wallet
//! - [`HttpClient`] - transport hosts plug in (see `backend-reqwest`)

mod client;
mod configuration;
pub mod constants;
mod error;
pub mod identifier;
pub mod logger;
pub mod networking;
mod nonce;
pub mod requests;
pub mod requirements;
pub mod root_of_trust;
mod styles;
pub mod token;
pub mod verified_id;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::*;
pub use configuration::{LibraryConfiguration, PreviewFeatureFlags};
pub use error::{codes, ErrorDetail, Result, VerifiedIdError, VerifiedIdResult};
pub use logger::{CallSite, LogConsumer, LogLevel, WalletLibraryLogger};
pub use networking::{CorrelationHeader, HttpClient, HttpResponse, RequestCorrelationHeader};
pub use nonce::NonceCreator;
pub use requests::{
    RequestProcessorExtendable, VerifiedIdIssuanceRequest, VerifiedIdPartialRequest,
    VerifiedIdPresentationRequest, VerifiedIdRequest, VerifiedIdRequestInput,
};
pub use requirements::Requirement;
pub use root_of_trust::{RootOfTrust, RootOfTrustResolver};
pub use styles::{Logo, RequesterStyle, VerifiedIdStyle};
pub use verified_id::{VerifiedId, VerifiedIdClaim};

// re-export for consumers handling keys and signatures directly
pub use vid_secp256k1;
