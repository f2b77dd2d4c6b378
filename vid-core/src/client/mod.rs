//! The Verified ID client.
//!
//! ## Core Types
//!
//! - [`VerifiedIdClientBuilder`] - collects host configuration and wires the library
//! - [`VerifiedIdClient`] - creates requests, encodes and decodes Verified IDs
//! - [`RequestResolverFactory`] / [`RequestProcessorFactory`] - pick the
//!   resolver and processor for an input

mod builder;
#[allow(clippy::module_inception)]
mod client;
mod factory;

pub use builder::VerifiedIdClientBuilder;
pub use client::VerifiedIdClient;
pub use factory::{RequestProcessorFactory, RequestResolverFactory};
