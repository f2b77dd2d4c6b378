//! OpenID for Verifiable Credential Issuance.
//!
//! A credential offer is processed against the issuer's metadata into an
//! [`OpenId4VciRequest`]; completing it POSTs a proof-bound credential
//! request with the access token the requirement collected.

mod credential_request;
mod models;
mod pre_auth;
mod processor;
mod request;
mod signed_metadata;

pub use models::*;
pub use pre_auth::PreAuthTokenResolver;
pub use processor::OpenId4VciProcessor;
pub use request::OpenId4VciRequest;
pub use signed_metadata::SignedMetadataProcessor;
