//! [`HttpClient`](vid_core::HttpClient) implementation over `reqwest`.
//!
//! Hand a [`ReqwestClient`] to
//! [`VerifiedIdClientBuilder::new`](vid_core::VerifiedIdClientBuilder::new).

mod reqwest_impl;

pub use reqwest_impl::ReqwestClient;
