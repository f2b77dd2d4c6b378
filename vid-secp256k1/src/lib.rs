//! ES256K primitives for the Verified ID wallet.
//!
//! Thin wrapper over the `secp256k1` crate exposing exactly what the wallet
//! needs for JWS signing: key pair handling, uncompressed public key
//! coordinates and SHA-256 based ECDSA with compact `r||s` signatures.
//!
//! ## Core Types
//!
//! - [`KeyPair`]: a secret key with its public key
//! - [`Es256k`]: sign and verify over arbitrary messages
//! - [`version`]: framework version metadata

mod error;
mod es256k;
mod hash;
mod keys;
pub mod version;

pub use error::{Error, Result};
pub use es256k::Es256k;
pub use hash::{sha256, sha512};
pub use keys::{public_key_from_coordinates, KeyPair, COORDINATE_LEN};

// re-export the curve library for consumers holding raw keys
pub use secp256k1;
