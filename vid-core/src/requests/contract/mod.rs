//! Issuance of Verified IDs described by a signed contract.
//!
//! A presentation request with `prompt=create` points at a contract through
//! its input descriptor. The contract lists what the holder must supply,
//! and the holder's answer is posted to the contract's credential issuer.

mod models;
mod processor;
mod request;
mod resolver;
mod response;

pub use models::*;
pub use processor::ContractIssuanceProcessor;
pub use request::ContractIssuanceRequest;
pub use resolver::{ManifestResolver, ResolvedContract};
pub use response::IssuanceResponseContainer;

#[cfg(test)]
pub(crate) use models::tests::contract_json;
