//! Verified ID WalletLibrary.
//!
//! Umbrella crate for hosts: re-exports the wallet core and the Secp256k1
//! framework, and wires the reqwest transport by default.
//!
//! ```ignore
//! let client = wallet_library::builder()
//!     .with_preferred_languages(vec!["en".into()])
//!     .build()?;
//! let request = client.create_request(&input).await?;
//! ```

pub mod version;

pub use vid_core::*;

// re-export the framework for consumers handling keys and signatures directly
pub use vid_secp256k1 as secp256k1_framework;

#[cfg(feature = "backend-reqwest")]
pub use backend_reqwest::ReqwestClient;

/// Builder over the default reqwest transport.
#[cfg(feature = "backend-reqwest")]
pub fn builder() -> VerifiedIdClientBuilder<ReqwestClient> {
    VerifiedIdClientBuilder::new(ReqwestClient::new())
}
